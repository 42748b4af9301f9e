/// Skip a test if git is not installed.
#[macro_export]
macro_rules! skip_without_git {
    () => {
        if which::which("git").is_err() {
            eprintln!("SKIPPED: git not installed");
            return;
        }
    };
}
