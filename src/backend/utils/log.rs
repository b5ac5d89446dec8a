// src/backend/utils/log.rs
// Canister log lines. On wasm they go to the replica log via ic_cdk::println;
// native builds (tests, tooling) write the same line to stderr.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl Level {
    fn tag(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

pub fn emit(level: Level, component: &str, message: &str) {
    let line = format!("{}: [{}] {}", level.tag(), component, message);
    #[cfg(target_arch = "wasm32")]
    ic_cdk::println!("{}", line);
    #[cfg(not(target_arch = "wasm32"))]
    eprintln!("{}", line);
}

#[macro_export]
macro_rules! log_info {
    ($component:expr, $($arg:tt)*) => {
        $crate::utils::log::emit($crate::utils::log::Level::Info, $component, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($component:expr, $($arg:tt)*) => {
        $crate::utils::log::emit($crate::utils::log::Level::Warn, $component, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($component:expr, $($arg:tt)*) => {
        $crate::utils::log::emit($crate::utils::log::Level::Error, $component, &format!($($arg)*))
    };
}
