use std::sync::OnceLock;

static QUIET: OnceLock<bool> = OnceLock::new();

fn quiet_from_env() -> bool {
    std::env::var("CITAS_QUIET")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Fix quiet mode for the process: the `--quiet` flag or `CITAS_QUIET=1`.
/// Must run before the first [`is_quiet`] call to take effect.
pub fn set_quiet(flag: bool) {
    let _ = QUIET.set(flag || quiet_from_env());
}

/// Quiet mode drops status lines and headers; tables, JSON and errors still print
pub fn is_quiet() -> bool {
    *QUIET.get_or_init(quiet_from_env)
}
