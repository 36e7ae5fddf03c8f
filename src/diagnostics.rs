// Klass Diagnostics
// Colored trace lines naming the class and method a message came from.
// Lines go to stderr, or into a buffer while `capture` is running.

use crate::runtime::{Receiver, Value};
use crate::template;
use colored::*;
use std::cell::RefCell;

const UNKNOWN_NAME: &str = "unknown";
const ANONYMOUS_NAME: &str = "anonymous";
const TRACE_TEMPLATE: &str = "  at %name% (%link%)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    User,
    Error,
}

impl Tone {
    fn paint(self, line: &str) -> ColoredString {
        match self {
            Tone::Success => line.truecolor(0x4F, 0x8A, 0x10),
            Tone::User => line.truecolor(0x00, 0x8B, 0x8B),
            Tone::Error => line.truecolor(0xD8, 0x00, 0x0C),
        }
    }
}

thread_local! {
    static CAPTURED: RefCell<Option<Vec<String>>> = const { RefCell::new(None) };
}

/// Run `f` with diagnostics collected as plain lines instead of printed
pub fn capture<R>(f: impl FnOnce() -> R) -> (R, Vec<String>) {
    let outer = CAPTURED.with(|c| c.borrow_mut().replace(Vec::new()));
    let result = f();
    let lines = CAPTURED.with(|c| std::mem::replace(&mut *c.borrow_mut(), outer));
    (result, lines.unwrap_or_default())
}

fn emit(line: String, tone: Tone) {
    let captured = CAPTURED.with(|c| match c.borrow_mut().as_mut() {
        Some(buffer) => {
            buffer.push(line.clone());
            true
        }
        None => false,
    });
    if !captured {
        eprintln!("{}", tone.paint(&line));
    }
}

fn context_name(receiver: &Receiver) -> String {
    receiver
        .called_function_context_name()
        .unwrap_or_else(|| receiver.class().name())
}

fn join_parts(parts: &[Value]) -> String {
    parts
        .iter()
        .map(|p| match p {
            Value::String(s) => s.to_string(),
            other => format!("{:?}", other),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Message raised by user code: `Class.method [parts]`
pub fn log_message(context: Option<&Receiver>, parts: &[Value], error: bool) {
    let message = format!("[{}]", join_parts(parts));
    let tone = if error { Tone::Error } else { Tone::User };
    log(context, &message, tone);
}

/// Framework-level message with the success tone
pub fn log_success(context: Option<&Receiver>, message: &str) {
    log(context, message, Tone::Success);
}

/// Framework-level message with the error tone
pub fn log_error(context: Option<&Receiver>, message: &str) {
    log(context, message, Tone::Error);
}

fn log(context: Option<&Receiver>, message: &str, tone: Tone) {
    let receiver = match context {
        Some(receiver) => receiver,
        None => {
            emit(message.to_string(), tone);
            return;
        }
    };

    let class_name = context_name(receiver);
    let class_name = if class_name.is_empty() {
        UNKNOWN_NAME.to_string()
    } else {
        class_name
    };
    let method_name = receiver
        .called_function_name()
        .unwrap_or_else(|| ANONYMOUS_NAME.to_string());

    emit(format!("{}.{} {}", class_name, method_name, message), tone);

    let deep = receiver.class().settings().deep_logging;
    if deep || method_name == ANONYMOUS_NAME {
        let link = receiver
            .called_function()
            .map(|f| format!("fn {}", f.original().name()))
            .unwrap_or_else(|| "no method executing".to_string());
        let name = format!("{}.{}", class_name, method_name);
        emit(
            template::render(TRACE_TEMPLATE, &[("name", name.as_str()), ("link", link.as_str())]),
            tone,
        );
    }
}
