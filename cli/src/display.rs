use {
    crate::prelude::*,
    colored::ColoredString,
    std::{
        sync::{Arc, Mutex},
        thread,
    },
};

/// Whether pretty output is suppressed in favor of JSON.
pub(crate) fn json_mode() -> bool {
    JSON_MODE.load(Ordering::Relaxed)
}

/// Print a grey colored line to separate sections
pub(crate) fn separator() -> ColoredString {
    "\n-=-=-=-=-=-=-=-".truecolor(100, 100, 100)
}

/// Print the title of the currently executed command.
#[macro_export]
macro_rules! command_title {
    ($($args:tt)*) => {
        if !$crate::display::json_mode() {
            println!(
                "\n{arrow} {title}{separator}",
                arrow = "▶".bold().purple(),
                title = format!($($args)*).bold(),
                separator = $crate::display::separator()
            );
        }
    };
}

/// Notify the user of a successful operation. Basicaly [`println!`] but
/// includes a not [`JSON_MODE`] check and some success formatting.
#[macro_export]
macro_rules! notify_success {
    ($($args:tt)*) => {
        if !$crate::display::json_mode() {
            println!(
                "[{check}] {msg}",
                check = "✔".green().bold(),
                msg = format!($($args)*)
            );
        }
    };
}

/// Similar to [`notify_success!`] but for errors.
#[macro_export]
macro_rules! notify_error {
    ($($args:tt)*) => {
        if !$crate::display::json_mode() {
            eprintln!(
                "[{ballot}] {msg}",
                ballot = "✘".red().bold(),
                msg = format!($($args)*)
            );
        }
    };
}

/// Formatted list item.
#[macro_export]
macro_rules! item {
    ($($args:tt)*) => {
        if !$crate::display::json_mode() {
            println!(
                "    {arrow} {item}",
                arrow = "▶".truecolor(100, 100, 100),
                item = format!($($args)*)
            );
        }
    };
}

/// Macro to print a loading state. Accepts a message and returns `success` and
/// `error` handles to change the state of the loading.
#[macro_export]
macro_rules! loading {
    ($($args:tt)*) => {{
        let msg = format!($($args)*);

        $crate::display::LoadingHandle::start(msg)
    }};
}

/// Struct helping with handling loading state.
pub(crate) struct LoadingHandle {
    success: Arc<Mutex<bool>>,
    error: Arc<Mutex<bool>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl LoadingHandle {
    /// Spin until [`LoadingHandle::success`] or [`LoadingHandle::error`] is
    /// called. Nothing is printed in [`JSON_MODE`].
    pub(crate) fn start(msg: String) -> Self {
        use std::io::Write;

        let success = Arc::new(Mutex::new(false));
        let error = Arc::new(Mutex::new(false));

        if json_mode() {
            return Self {
                success,
                error,
                thread: None,
            };
        }

        let thread = {
            let success = success.clone();
            let error = error.clone();

            thread::spawn(move || {
                let frames = ["/", "-", "\\", "|"];

                let mut i = 0;

                loop {
                    print!("\r[{}] {msg} ", frames[i].purple());

                    if *success.lock().unwrap_or_else(|e| e.into_inner()) {
                        println!("\r[{check}] {msg}", check = "✔".green().bold());

                        break;
                    }

                    if *error.lock().unwrap_or_else(|e| e.into_inner()) {
                        println!("\r[{ballot}] {msg}", ballot = "✘".red().bold());

                        break;
                    }

                    i = (i + 1) % frames.len();

                    let _ = std::io::stdout().flush();

                    thread::sleep(std::time::Duration::from_millis(100));
                }
            })
        };

        Self {
            success,
            error,
            thread: Some(thread),
        }
    }

    /// Mark the loading as successful.
    pub(crate) fn success(self) {
        let flag = self.success.clone();

        self.finish(flag);
    }

    /// Mark the loading as errored.
    pub(crate) fn error(self) {
        let flag = self.error.clone();

        self.finish(flag);
    }

    fn finish(mut self, flag: Arc<Mutex<bool>>) {
        *flag.lock().unwrap_or_else(|e| e.into_inner()) = true;

        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// If [`JSON_MODE`] is enabled, output the given data as JSON.
pub(crate) fn json_output<T: Serialize>(data: &T) -> AnyResult<(), WalrusCliError> {
    if !json_mode() {
        return Ok(());
    }

    match serde_json::to_string_pretty(data) {
        Ok(json) => {
            println!("{}", json);

            Ok(())
        }
        Err(e) => Err(WalrusCliError::Any(e.into())),
    }
}
