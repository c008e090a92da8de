use std::{cell::RefCell, ffi::OsStr, str::FromStr};

use log::LevelFilter;

/// Name of the variable selecting the log level.
pub const LOG_VAR: &str = "CIVM_LOG";

#[derive(Clone, Copy)]
struct Env {
    log_level: LevelFilter,
    no_color: bool,
}

thread_local! {
    /// Must only be mutated within `set_env`
    static ENV: RefCell<Option<Env>> = const { RefCell::new(None) };
}

pub fn init() {
    let value = Env {
        log_level: var_parse(LOG_VAR).unwrap_or(LevelFilter::Warn),
        no_color: std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()),
    };
    set_env(value);
}

pub fn log_level() -> LevelFilter {
    with_env(|env| env.log_level)
}

pub fn is_color_disabled() -> bool {
    with_env(|env| env.no_color)
}

fn set_env(value: Env) {
    ENV.with(|env| {
        let mut env = env.borrow_mut();
        assert!(
            env.is_none(),
            "tried to initialize environment state multiple times"
        );
        *env = Some(value);
    });
}

fn with_env<F, R>(callback: F) -> R
where
    F: Fn(&Env) -> R,
{
    ENV.with(|env| {
        let env = env.borrow();
        let env = env.unwrap_or_else(|| {
            panic!("tried to access environment state before initialization");
        });
        callback(&env)
    })
}

/// Parse a variable, ignoring it if unset or malformed.
fn var_parse<T: FromStr>(name: impl AsRef<OsStr>) -> Option<T> {
    std::env::var(name.as_ref()).ok()?.trim().parse().ok()
}
