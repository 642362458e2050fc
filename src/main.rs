fn main() {
    if let Err(err) = report_buildpacks::cli::run() {
        report_buildpacks::ui::eprintln_error(&err);
        std::process::exit(report_buildpacks::exit::exit_code(&err));
    }
}
