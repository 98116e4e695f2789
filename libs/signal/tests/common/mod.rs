#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io::{self, Write};
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::{Map, Value};
use tether_signal::{
    CallContext, CallDescriptor, ChannelHandle, Error, Evaluator, Forwarding, ForwardingMode,
    PersistentChannel, Result, Session,
};

/// Persistent channel that records what is sent and replays canned replies
#[derive(Debug, Default)]
pub struct Scripted {
    pub replies: VecDeque<String>,
    pub sent: Vec<String>,
    pub receives: usize,
}

impl Scripted {
    pub fn sent_json(&self) -> Vec<Value> {
        self.sent
            .iter()
            .map(|text| serde_json::from_str(text).unwrap())
            .collect()
    }
}

impl PersistentChannel for Scripted {
    fn send(&mut self, text: &str) -> Result<()> {
        self.sent.push(text.to_string());
        Ok(())
    }

    fn receive(&mut self) -> Result<String> {
        self.receives += 1;
        self.replies
            .pop_front()
            .ok_or(Error::Fabric(tether_fabric::Error::ConnectionClosed))
    }
}

pub fn scripted(replies: &[&str]) -> (Rc<RefCell<Scripted>>, ChannelHandle) {
    let shared = Rc::new(RefCell::new(Scripted {
        replies: replies.iter().map(|reply| reply.to_string()).collect(),
        ..Default::default()
    }));
    let handle = ChannelHandle::Persistent(shared.clone());
    (shared, handle)
}

/// Evaluator answering per function name and recording every call
#[derive(Debug, Default)]
pub struct Embedded {
    pub replies: HashMap<String, String>,
    pub calls: Vec<(String, Map<String, Value>)>,
}

impl Evaluator for Embedded {
    fn evaluate(&mut self, func: &str, kwargs: &Map<String, Value>) -> Result<String> {
        self.calls.push((func.to_string(), kwargs.clone()));
        self.replies
            .get(func)
            .cloned()
            .ok_or_else(|| Error::evaluator(format!("no such function: {func}")))
    }
}

pub fn embedded(replies: &[(&str, &str)]) -> (Rc<RefCell<Embedded>>, ChannelHandle) {
    let shared = Rc::new(RefCell::new(Embedded {
        replies: replies
            .iter()
            .map(|(func, reply)| (func.to_string(), reply.to_string()))
            .collect(),
        ..Default::default()
    }));
    let handle = ChannelHandle::Direct(shared.clone());
    (shared, handle)
}

/// Top-level page: owns the session
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub title: String,
    pub mode: ForwardingMode,
    pub session: Option<Session>,
}

impl Forwarding for Page {
    fn mode(&self) -> ForwardingMode {
        self.mode
    }

    fn session(&self) -> Option<Session> {
        self.session.clone()
    }
}

/// Nested element: borrows its page's session through a back-reference
#[derive(Debug, Clone)]
pub struct Element {
    pub id: String,
    pub text: String,
    pub mode: ForwardingMode,
    pub page: Rc<Page>,
}

impl Element {
    pub fn on(page: Page, id: &str) -> Self {
        Self {
            id: id.to_string(),
            text: String::new(),
            mode: ForwardingMode::Remote,
            page: Rc::new(page),
        }
    }
}

impl Forwarding for Element {
    fn mode(&self) -> ForwardingMode {
        self.mode
    }

    fn session(&self) -> Option<Session> {
        self.page.session()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SetText {
    pub text: String,
}

impl SetText {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

/// Forwards only when the text actually changed
pub fn set_text_signal(ctx: &CallContext<'_, Element, SetText, usize>) -> Option<CallDescriptor> {
    if ctx.original.text == ctx.object.text {
        return None;
    }
    Some(
        CallDescriptor::new("setText")
            .arg(ctx.object.id.as_str())
            .kwarg("text", ctx.args.text.as_str()),
    )
}

pub fn set_text_body(element: &mut Element, args: &SetText) -> usize {
    element.text = args.text.clone();
    element.text.len()
}

pub fn get_value_signal(ctx: &CallContext<'_, Element, (), ()>) -> Option<CallDescriptor> {
    Some(CallDescriptor::new("getValue").arg(ctx.object.id.as_str()))
}

pub fn get_files_signal(ctx: &CallContext<'_, Element, (), ()>) -> Option<CallDescriptor> {
    Some(CallDescriptor::new("getFiles").arg(ctx.object.id.as_str()))
}

pub fn files_reply(names: &[&str]) -> String {
    let files: Vec<Value> = names
        .iter()
        .enumerate()
        .map(|(index, name)| {
            serde_json::json!({
                "name": name,
                "size": 2,
                "type": "text/plain",
                "last-modified": 1_700_000_000_000u64,
                "file-id": index,
            })
        })
        .collect();
    serde_json::json!({"type": "files", "data": files}).to_string()
}

/// Log sink shared with a subscriber for the duration of a test
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with every event it logs captured as plain text
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let sink = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || sink.clone())
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, buffer.contents())
}
