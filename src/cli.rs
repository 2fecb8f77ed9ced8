// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print JSON instead of a table")
}

fn date_arg(help: &'static str) -> Arg {
    Arg::new("date").long("date").value_name("YYYY-MM-DD").help(help)
}

fn id_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .required(true)
        .value_parser(value_parser!(i64))
        .help(help)
}

fn borrower_fields(cmd: Command) -> Command {
    cmd.arg(Arg::new("name").long("name").help("Full display name"))
        .arg(Arg::new("title").long("title").help("Mr, Mrs, Ms, ..."))
        .arg(Arg::new("first_name").long("first-name"))
        .arg(Arg::new("last_name").long("last-name"))
        .arg(Arg::new("phone").long("phone"))
        .arg(Arg::new("address").long("address"))
        .arg(Arg::new("nic").long("nic").help("National ID number"))
}

fn loan_terms(cmd: Command, required: bool) -> Command {
    cmd.arg(
        Arg::new("principal")
            .long("principal")
            .required(required)
            .help("Amount lent"),
    )
    .arg(
        Arg::new("rate")
            .long("rate")
            .required(required)
            .help("Flat interest, percent of principal"),
    )
    .arg(
        Arg::new("days")
            .long("days")
            .required(required)
            .help("Duration in days"),
    )
    .arg(
        Arg::new("start")
            .long("start")
            .value_name("YYYY-MM-DD")
            .help("Start date (default: today)"),
    )
}

fn export_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("format")
            .long("format")
            .default_value("csv")
            .help("csv|json"),
    )
    .arg(Arg::new("out").long("out").required(true))
}

pub fn build_cli() -> Command {
    Command::new("easycollect")
        .about("Loan collection bookkeeping: borrowers, loans, daily payments")
        .version(clap::crate_version!())
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("config")
                .about("Application settings")
                .subcommand(Command::new("get").arg(Arg::new("key").required(true)))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").required(true))
                        .arg(Arg::new("value").required(true)),
                )
                .subcommand(Command::new("list")),
        )
        .subcommand(
            Command::new("borrower")
                .about("Manage borrowers")
                .subcommand(borrower_fields(Command::new("add")))
                .subcommand(Command::new("list").arg(date_arg("Stats as of")).arg(json_flag()))
                .subcommand(
                    Command::new("show")
                        .arg(id_arg("id", "Borrower id"))
                        .arg(date_arg("Stats as of"))
                        .arg(json_flag()),
                )
                .subcommand(borrower_fields(
                    Command::new("edit").arg(id_arg("id", "Borrower id")),
                ))
                .subcommand(Command::new("rm").arg(id_arg("id", "Borrower id"))),
        )
        .subcommand(
            Command::new("loan")
                .about("Manage loans")
                .subcommand(loan_terms(
                    Command::new("add").arg(
                        Arg::new("borrower")
                            .long("borrower")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                    true,
                ))
                .subcommand(
                    Command::new("list")
                        .arg(
                            Arg::new("borrower")
                                .long("borrower")
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(Arg::new("status").long("status").help("active|completed|overdue"))
                        .arg(date_arg("Classify as of"))
                        .arg(json_flag()),
                )
                .subcommand(
                    Command::new("show")
                        .arg(id_arg("id", "Loan id"))
                        .arg(date_arg("Classify as of"))
                        .arg(json_flag()),
                )
                .subcommand(loan_terms(
                    Command::new("edit").arg(id_arg("id", "Loan id")),
                    false,
                ))
                .subcommand(Command::new("rm").arg(id_arg("id", "Loan id"))),
        )
        .subcommand(
            Command::new("pay")
                .about("Collect and reverse payments")
                .subcommand(
                    Command::new("collect")
                        .arg(
                            Arg::new("loan")
                                .long("loan")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(
                            Arg::new("amount")
                                .long("amount")
                                .help("Default: the loan's daily installment"),
                        )
                        .arg(Arg::new("method").long("method"))
                        .arg(Arg::new("notes").long("notes"))
                        .arg(date_arg("Payment date (default: today)"))
                        .arg(Arg::new("time").long("time").value_name("HH:MM[:SS]")),
                )
                .subcommand(
                    Command::new("reverse")
                        .arg(
                            Arg::new("payment")
                                .long("payment")
                                .value_parser(value_parser!(i64))
                                .conflicts_with("loan"),
                        )
                        .arg(
                            Arg::new("loan")
                                .long("loan")
                                .value_parser(value_parser!(i64))
                                .help("Reverse this loan's latest payment"),
                        ),
                )
                .subcommand(
                    Command::new("history")
                        .arg(
                            Arg::new("loan")
                                .long("loan")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(json_flag()),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Dashboards and collection reports")
                .subcommand(
                    Command::new("dashboard")
                        .arg(date_arg("As of"))
                        .arg(json_flag()),
                )
                .subcommand(
                    Command::new("daily")
                        .arg(date_arg("Collection day (default: today)"))
                        .arg(json_flag()),
                )
                .subcommand(
                    Command::new("borrowers")
                        .arg(date_arg("As of"))
                        .arg(json_flag()),
                )
                .subcommand(
                    Command::new("overdue")
                        .arg(date_arg("As of"))
                        .arg(json_flag()),
                )
                .subcommand(
                    Command::new("collections")
                        .arg(Arg::new("from").long("from").required(true))
                        .arg(Arg::new("to").long("to").required(true))
                        .arg(json_flag()),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand(export_args(Command::new("payments")))
                .subcommand(export_args(Command::new("loans")).arg(date_arg("As of")))
                .subcommand(
                    Command::new("backup")
                        .arg(Arg::new("out").long("out").required(true))
                        .arg(date_arg("Classify loan statuses as of")),
                ),
        )
        .subcommand(
            Command::new("import").about("Import data").subcommand(
                Command::new("backup").arg(Arg::new("path").long("path").required(true)),
            ),
        )
        .subcommand(
            Command::new("doctor")
                .about("Check stored loans against their payments")
                .arg(date_arg("As of"))
                .arg(
                    Arg::new("fix")
                        .long("fix")
                        .action(ArgAction::SetTrue)
                        .help("Rewrite stale statuses"),
                ),
        )
}
