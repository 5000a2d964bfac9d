use std::process::Command;

/// Create a new exposure CLI command that ignores any corpus configured in the environment
pub fn exposure() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_exposure"));
    cmd.env_remove("EXPOSURE_CORPUS_URL").env("RUST_LOG", "warn");
    cmd
}
