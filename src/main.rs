fn main() -> std::process::ExitCode {
    linkwatch_lib::run()
}
