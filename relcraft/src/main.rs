use std::io::Write;

use clap::Parser;
use cli::{Cli, Commands, OutputFormat};
use console::{style, Term};
use miette::IntoDiagnostic;
use relcraft::config::{self, Config};
use relcraft::platform::Platform;
use relcraft::process::SystemRunner;
// Import everything from the lib version of ourselves
use relcraft::*;
use relcraft_schema::{
    ConfigReport, InstallReport, PublishReport, ReleaseReport, Report, StepReport,
};
use serde::Serialize;

mod cli;

fn main() {
    let cli = Cli::parse();
    axocli::CliAppBuilder::new("relcraft")
        .verbose(cli.verbose)
        .json_errors(cli.output_format == OutputFormat::Json)
        .start(cli, real_main);
}

fn real_main(app: &axocli::CliApp<Cli>) -> Result<(), miette::Report> {
    let cli = &app.config;
    let command = cli.command.clone().unwrap_or(Commands::Config);

    let publish = match &command {
        Commands::Schema => return cmd_schema(),
        Commands::Publish(args) => Some(args),
        _ => None,
    };
    let cfg = load_config(cli, publish)?;
    if cli.print_config {
        return print_report(cli, &Report::Config(do_config(&cfg)?));
    }

    let mut runner = SystemRunner;
    let report = match command {
        Commands::Config => Report::Config(do_config(&cfg)?),
        Commands::Checkout(args) => {
            header("checking out source");
            Report::Step(do_checkout(&cfg, &mut runner, args.submodules)?)
        }
        Commands::Configure(args) => {
            header("configuring");
            Report::Step(do_configure(&cfg, &mut runner, &args.cmake_args)?)
        }
        Commands::Build => {
            header("building");
            Report::Step(do_build(&cfg, &mut runner)?)
        }
        Commands::Clean => Report::Step(do_clean(&cfg, &mut runner)?),
        Commands::Reset => Report::Step(do_reset(&cfg)?),
        Commands::ReleaseName => Report::Release(do_release_name(&cfg, &mut runner)?),
        Commands::ReleaseFolder => {
            header("creating local release folder");
            Report::Release(do_release_folder(&cfg, &mut runner)?)
        }
        Commands::Install(args) => {
            header("installing package");
            Report::Install(do_install(&cfg, &mut runner, args.fresh)?)
        }
        Commands::RemovePrevious => {
            header("removing files from previous install");
            Report::Step(do_remove_previous(&cfg)?)
        }
        Commands::Publish(args) => {
            header("publishing release");
            let args = PublishArgs {
                source: args.source.clone(),
            };
            Report::Publish(do_publish(&cfg, &mut runner, &args)?)
        }
        Commands::Schema => return cmd_schema(),
    };
    print_report(cli, &report)
}

fn load_config(cli: &Cli, publish: Option<&cli::PublishCmdArgs>) -> Result<Config, miette::Report> {
    let platform = Platform::host()?;
    let layer = cli.build.to_layer(publish)?;
    let cfg = config::load(
        platform,
        cli.build.root_dir.as_deref(),
        cli.build.config.as_deref(),
        layer,
    )?;
    Ok(cfg)
}

fn header(title: &str) {
    let mut err = Term::stderr();
    let _ = writeln!(err, "{}", style(format!("=== {title} ===")).bold().cyan());
}

fn cmd_schema() -> Result<(), miette::Report> {
    let schema = Report::json_schema();
    let json = serde_json::to_string_pretty(&schema).into_diagnostic()?;
    println!("{json}");
    Ok(())
}

fn print_report(cli: &Cli, report: &Report) -> Result<(), miette::Report> {
    let mut out = Term::stdout();
    match cli.output_format {
        OutputFormat::Human => print_human(&mut out, report).into_diagnostic()?,
        OutputFormat::Json => print_json(&mut out, report).into_diagnostic()?,
    }
    Ok(())
}

fn print_json(out: &mut Term, report: &impl Serialize) -> Result<(), std::io::Error> {
    let string = serde_json::to_string_pretty(report)?;
    writeln!(out, "{string}")?;
    Ok(())
}

fn print_human(out: &mut Term, report: &Report) -> Result<(), std::io::Error> {
    match report {
        Report::Config(report) => print_human_config(out, report),
        Report::Step(report) => print_human_step(out, report),
        Report::Release(report) => print_human_release(out, report),
        Report::Install(report) => print_human_install(out, report),
        Report::Publish(report) => print_human_publish(out, report),
    }
}

fn print_human_config(out: &mut Term, report: &ConfigReport) -> Result<(), std::io::Error> {
    writeln!(out, "{}", style("relcraft configuration").bold())?;
    let rows = [
        ("platform", report.platform.clone()),
        ("root dir", report.root_dir.clone()),
        ("source dir", report.source_dir.clone()),
        ("build dir", report.build_dir.clone()),
        ("installer dir", report.installer_dir.clone()),
        ("install root", report.install_root.clone()),
        ("build type", report.build_type.clone()),
        ("externals type", report.build_externals_type.clone()),
        ("static", report.is_static.to_string()),
        ("32 bit", report.is_32_bit.to_string()),
        ("short pathnames", report.short_pathnames.to_string()),
        ("generator", report.generator.clone()),
        ("build folder", report.build_folder.clone()),
        ("threads", report.threads.to_string()),
        (
            "git tag",
            report.git_tag.clone().unwrap_or_else(|| "(none)".to_owned()),
        ),
        ("main branch", report.main_branch.clone()),
    ];
    for (name, val) in rows {
        writeln!(out, "  {:<16} {val}", format!("{name}:"))?;
    }
    writeln!(out, "  cmake options:")?;
    for (key, val) in &report.cmake_options {
        writeln!(out, "    {key} = {val}")?;
    }
    Ok(())
}

fn print_human_step(out: &mut Term, report: &StepReport) -> Result<(), std::io::Error> {
    writeln!(out, "{} ({})", style(&report.step).bold(), report.dir)?;
    for command in &report.commands {
        writeln!(out, "  {command}")?;
    }
    Ok(())
}

fn print_human_release(out: &mut Term, report: &ReleaseReport) -> Result<(), std::io::Error> {
    writeln!(out, "{}", style(&report.resolved_name).bold())?;
    if report.is_dirty {
        if let Some(describe) = &report.describe {
            writeln!(out, "  not at a tag, nearest is {describe}")?;
        }
    }
    if let Some(folder) = &report.folder {
        writeln!(out, "  {folder}")?;
    }
    Ok(())
}

fn print_human_install(out: &mut Term, report: &InstallReport) -> Result<(), std::io::Error> {
    writeln!(
        out,
        "installed {} to {} ({})",
        style(&report.installer).bold(),
        report.install_root,
        report.procedure
    )
}

fn print_human_publish(out: &mut Term, report: &PublishReport) -> Result<(), std::io::Error> {
    writeln!(
        out,
        "published {} to {}:{}",
        style(&report.source).bold(),
        report.server,
        report.remote_path
    )?;
    for entry in &report.entries {
        writeln!(out, "  {entry}")?;
    }
    Ok(())
}
