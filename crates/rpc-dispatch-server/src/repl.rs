//! Interactive REPL over an in-process dispatcher.
//!
//! Launch with `rpc-dispatch-server repl`. Raw JSON-RPC payloads are
//! dispatched as typed; `/call` builds the envelope for you. Type `/help`
//! for available commands, Tab for completion.

use std::sync::Arc;

use rustyline::completion::{Completer, Pair};
use rustyline::config::CompletionType;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Config, Editor, Helper};
use serde_json::{json, Value};

use rpc_dispatch::Dispatcher;

use crate::demo;
use crate::methods::{default_registry, list_methods};

/// Available REPL commands.
const COMMANDS: &[(&str, &str)] = &[
    ("/call", "Call a method: /call <method> [params-json]"),
    ("/notify", "Send a notification: /notify <method> [params-json]"),
    ("/methods", "List registered methods"),
    ("/demo", "Replay the scripted demo calls"),
    ("/clear", "Clear the screen"),
    ("/help", "Show available commands"),
    ("/exit", "Quit the REPL"),
];

/// REPL helper for tab completion.
struct RpcHelper {
    methods: Vec<String>,
}

impl Completer for RpcHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let input = &line[..pos];

        if !input.contains(' ') {
            let matches: Vec<Pair> = COMMANDS
                .iter()
                .filter(|(cmd, _)| cmd.starts_with(input))
                .map(|(cmd, desc)| Pair {
                    display: format!("{cmd:<16} {desc}"),
                    replacement: format!("{cmd} "),
                })
                .collect();
            return Ok((0, matches));
        }

        // Method name completion
        let mut parts = input.splitn(2, ' ');
        let cmd = parts.next().unwrap_or("");
        let args = parts.next().unwrap_or("");

        if (cmd == "/call" || cmd == "/notify") && !args.contains(' ') {
            let prefix_start = input.len() - args.len();
            let matches: Vec<Pair> = self
                .methods
                .iter()
                .filter(|m| m.starts_with(args))
                .map(|m| Pair {
                    display: m.clone(),
                    replacement: format!("{m} "),
                })
                .collect();
            return Ok((prefix_start, matches));
        }

        Ok((pos, Vec::new()))
    }
}

impl RpcHelper {
    /// Unique completion of `prefix` among `candidates`, minus the prefix.
    fn unique_suffix<'a, I>(prefix: &str, candidates: I) -> Option<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut matches = candidates
            .into_iter()
            .filter(|c| c.len() > prefix.len() && c.starts_with(prefix));
        let only = matches.next()?;
        matches.next().is_none().then(|| only[prefix.len()..].to_string())
    }
}

impl Hinter for RpcHelper {
    type Hint = String;

    /// Greyed-out completion when exactly one command or method name fits.
    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        if pos < line.len() || !line.starts_with('/') {
            return None;
        }
        match line.split_once(' ') {
            None => Self::unique_suffix(line, COMMANDS.iter().map(|(cmd, _)| *cmd)),
            Some(("/call" | "/notify", method)) if !method.contains(' ') => {
                Self::unique_suffix(method, self.methods.iter().map(String::as_str))
            }
            Some(_) => None,
        }
    }
}

impl Highlighter for RpcHelper {}
impl Validator for RpcHelper {}
impl Helper for RpcHelper {}

/// Session state.
struct ReplState {
    dispatcher: Dispatcher,
    next_id: i64,
}

fn history_path() -> Option<std::path::PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(std::path::PathBuf::from(home).join(".rpc_dispatch_history"))
}

/// Run the interactive REPL.
pub fn run() -> anyhow::Result<()> {
    let registry = Arc::new(default_registry()?);
    let methods: Vec<String> = registry.names().into_iter().map(String::from).collect();

    eprintln!(
        "rpc-dispatch-server {} repl: {} methods ({})",
        env!("CARGO_PKG_VERSION"),
        methods.len(),
        methods.join(", ")
    );
    eprintln!("Paste a JSON-RPC payload to dispatch it, or /help for commands.");

    let mut state = ReplState {
        dispatcher: Dispatcher::new(registry),
        next_id: 1,
    };

    let config = Config::builder()
        .auto_add_history(true)
        .max_history_size(500)?
        .completion_type(CompletionType::List)
        .build();

    let mut rl: Editor<RpcHelper, DefaultHistory> = Editor::with_config(config)?;
    rl.set_helper(Some(RpcHelper { methods }));

    let history = history_path();
    if let Some(path) = history.as_deref().filter(|p| p.exists()) {
        if let Err(e) = rl.load_history(path) {
            tracing::debug!("could not load history from {}: {e}", path.display());
        }
    }

    let prompt = "rpc> ";

    loop {
        match rl.readline(prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let Some(input) = line.strip_prefix('/') else {
                    send(&state, line.as_bytes());
                    continue;
                };
                if input.is_empty() {
                    cmd_help();
                    continue;
                }

                let mut parts = input.splitn(2, ' ');
                let cmd = parts.next().unwrap_or("");
                let args = parts.next().unwrap_or("").trim();

                match cmd {
                    "exit" | "quit" => break,
                    "help" | "h" | "?" => cmd_help(),
                    "clear" | "cls" => eprint!("\x1b[2J\x1b[H"),
                    "methods" => cmd_methods(),
                    "demo" => cmd_demo(&state),
                    "call" => cmd_call(args, &mut state, true),
                    "notify" => cmd_call(args, &mut state, false),
                    _ => {
                        eprintln!("  Unknown command '/{cmd}'. Type /help for commands.");
                    }
                }
            }
            Err(ReadlineError::Interrupted) => eprintln!("  (interrupted; /exit quits)"),
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("  Error: {err}");
                break;
            }
        }
    }

    if let Some(path) = &history {
        if let Err(e) = rl.save_history(path) {
            tracing::debug!("could not save history to {}: {e}", path.display());
        }
    }

    Ok(())
}

/// Build a request envelope from `/call` arguments.
fn build_call(args: &str, id: Option<i64>) -> Result<Value, String> {
    let mut parts = args.splitn(2, ' ');
    let method = parts.next().unwrap_or("").trim();
    if method.is_empty() {
        return Err("Usage: /call <method> [params-json]".to_string());
    }

    let mut request = json!({ "jsonrpc": "2.0", "method": method });
    if let Some(raw) = parts.next().map(str::trim).filter(|r| !r.is_empty()) {
        let params: Value =
            serde_json::from_str(raw).map_err(|e| format!("Params are not valid JSON: {e}"))?;
        request["params"] = params;
    }
    if let Some(id) = id {
        request["id"] = json!(id);
    }
    Ok(request)
}

fn send(state: &ReplState, payload: &[u8]) {
    let reply = state.dispatcher.handle(payload);
    match reply.to_value() {
        Ok(Some(body)) => match serde_json::to_string_pretty(&body) {
            Ok(text) => println!("{text}"),
            Err(e) => eprintln!("  Failed to render reply: {e}"),
        },
        Ok(None) => eprintln!("  \x1b[90m(no response)\x1b[0m"),
        Err(e) => eprintln!("  Failed to render reply: {e}"),
    }
}

fn cmd_call(args: &str, state: &mut ReplState, expect_reply: bool) {
    let id = expect_reply.then_some(state.next_id);
    match build_call(args, id) {
        Ok(request) => {
            if expect_reply {
                state.next_id += 1;
            }
            match serde_json::to_vec(&request) {
                Ok(payload) => send(state, &payload),
                Err(e) => eprintln!("  Failed to encode request: {e}"),
            }
        }
        Err(msg) => eprintln!("  {msg}"),
    }
}

fn cmd_help() {
    eprintln!();
    eprintln!("  Commands:");
    eprintln!();
    for (cmd, desc) in COMMANDS {
        eprintln!("    {cmd:<18} {desc}");
    }
    eprintln!();
    eprintln!("  Anything not starting with '/' is sent as a raw payload.");
    eprintln!();
}

fn cmd_methods() {
    let methods = list_methods();
    eprintln!();
    eprintln!("  {} methods registered:", methods.len());
    eprintln!();
    for method in &methods {
        eprintln!(
            "    {:<16} {}",
            method.name,
            method.description.as_deref().unwrap_or("")
        );
    }
    eprintln!();
}

fn cmd_demo(state: &ReplState) {
    let mut stdout = std::io::stdout();
    if let Err(e) = demo::run(&state.dispatcher, &mut stdout) {
        eprintln!("  Demo failed: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_call_with_params() {
        let req = build_call(r#"math.add {"a":1,"b":2}"#, Some(4)).unwrap();
        assert_eq!(
            req,
            json!({"jsonrpc":"2.0","method":"math.add","params":{"a":1,"b":2},"id":4})
        );
    }

    #[test]
    fn test_build_notification_has_no_id() {
        let req = build_call("math.sum [1,2]", None).unwrap();
        assert!(req.get("id").is_none());
        assert_eq!(req["params"], json!([1, 2]));
    }

    #[test]
    fn test_build_call_without_params() {
        let req = build_call("math.add", Some(1)).unwrap();
        assert!(req.get("params").is_none());
    }

    #[test]
    fn test_build_call_errors() {
        assert!(build_call("", Some(1)).is_err());
        assert!(build_call("math.add {oops", Some(1)).is_err());
    }

    #[test]
    fn test_hint_unique_method() {
        let helper = RpcHelper {
            methods: vec!["math.add".into(), "math.sum".into(), "text.concat".into()],
        };
        let history = DefaultHistory::new();
        let ctx = rustyline::Context::new(&history);
        assert_eq!(helper.hint("/call te", 8, &ctx).as_deref(), Some("xt.concat"));
        assert_eq!(helper.hint("/call math.", 11, &ctx), None);
        assert_eq!(helper.hint("/me", 3, &ctx).as_deref(), Some("thods"));
        assert_eq!(helper.hint("{\"jsonrpc\"", 10, &ctx), None);
    }

    #[test]
    fn test_method_completion() {
        let helper = RpcHelper {
            methods: vec!["math.add".into(), "math.sum".into(), "text.concat".into()],
        };
        let history = DefaultHistory::new();
        let ctx = rustyline::Context::new(&history);
        let line = "/call math.";
        let (start, pairs) = helper.complete(line, line.len(), &ctx).unwrap();
        assert_eq!(start, "/call ".len());
        assert_eq!(pairs.len(), 2);
    }
}
