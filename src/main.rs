fn main() {
    if let Err(err) = overaudit::cli::run() {
        overaudit::ui::eprintln_error(&err);
        std::process::exit(overaudit::exit::exit_code(&err));
    }
}
