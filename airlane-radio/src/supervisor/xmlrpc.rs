//! supervisord XML-RPC client
//!
//! Speaks the subset of the supervisord API the adapters need:
//! `startProcess`, `stopProcess`, `getProcessInfo` and `signalProcess`,
//! POSTed to `<url>/RPC2`.

use super::{ProcessInfo, ProcessState, Supervisor, SupervisorFault};
use airlane_common::config::SupervisorConfig;
use airlane_common::time::secs_to_duration;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::BufReader;
use tracing::debug;
use xmltree::{Element, XMLNode};

/// XML-RPC request parameter
#[derive(Debug, Clone, PartialEq)]
pub enum Param<'a> {
    Str(&'a str),
    Bool(bool),
}

/// Decoded XML-RPC value
#[derive(Debug, Clone, PartialEq)]
pub enum XmlRpcValue {
    Int(i64),
    Bool(bool),
    Double(f64),
    Str(String),
    Struct(BTreeMap<String, XmlRpcValue>),
    Array(Vec<XmlRpcValue>),
    Nil,
}

impl XmlRpcValue {
    fn as_i64(&self) -> Option<i64> {
        match self {
            XmlRpcValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    fn as_str(&self) -> Option<&str> {
        match self {
            XmlRpcValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

fn text_element(name: &str, text: &str) -> Element {
    let mut element = Element::new(name);
    element.children.push(XMLNode::Text(text.to_string()));
    element
}

/// Build a `<methodCall>` document
pub fn build_method_call(method: &str, params: &[Param<'_>]) -> Result<String, SupervisorFault> {
    let mut call = Element::new("methodCall");
    call.children
        .push(XMLNode::Element(text_element("methodName", method)));

    let mut params_elem = Element::new("params");
    for param in params {
        let typed = match param {
            Param::Str(s) => text_element("string", s),
            Param::Bool(b) => text_element("boolean", if *b { "1" } else { "0" }),
        };
        let mut value = Element::new("value");
        value.children.push(XMLNode::Element(typed));
        let mut param_elem = Element::new("param");
        param_elem.children.push(XMLNode::Element(value));
        params_elem.children.push(XMLNode::Element(param_elem));
    }
    call.children.push(XMLNode::Element(params_elem));

    let mut buf = Vec::new();
    call.write(&mut buf)
        .map_err(|e| SupervisorFault::Transport(format!("Failed to encode request: {}", e)))?;
    String::from_utf8(buf)
        .map_err(|e| SupervisorFault::Transport(format!("Request is not UTF-8: {}", e)))
}

fn first_child_element(element: &Element) -> Option<&Element> {
    element.children.iter().find_map(|n| n.as_element())
}

fn malformed(what: &str) -> SupervisorFault {
    SupervisorFault::Transport(format!("Malformed XML-RPC response: {}", what))
}

fn parse_value(value: &Element) -> Result<XmlRpcValue, SupervisorFault> {
    let typed = match first_child_element(value) {
        Some(typed) => typed,
        // Untyped <value>text</value> is a string
        None => {
            return Ok(XmlRpcValue::Str(
                value.get_text().map(|t| t.into_owned()).unwrap_or_default(),
            ))
        }
    };

    let text = typed
        .get_text()
        .map(|t| t.trim().to_string())
        .unwrap_or_default();

    match typed.name.as_str() {
        "int" | "i4" | "i8" => text
            .parse()
            .map(XmlRpcValue::Int)
            .map_err(|_| malformed(&format!("bad int {:?}", text))),
        "boolean" => Ok(XmlRpcValue::Bool(text == "1")),
        "double" => text
            .parse()
            .map(XmlRpcValue::Double)
            .map_err(|_| malformed(&format!("bad double {:?}", text))),
        "string" => Ok(XmlRpcValue::Str(
            typed.get_text().map(|t| t.into_owned()).unwrap_or_default(),
        )),
        "nil" => Ok(XmlRpcValue::Nil),
        "struct" => {
            let mut members = BTreeMap::new();
            for member in typed.children.iter().filter_map(|n| n.as_element()) {
                let name = member
                    .get_child("name")
                    .and_then(|n| n.get_text())
                    .ok_or_else(|| malformed("struct member without name"))?;
                let inner = member
                    .get_child("value")
                    .ok_or_else(|| malformed("struct member without value"))?;
                members.insert(name.into_owned(), parse_value(inner)?);
            }
            Ok(XmlRpcValue::Struct(members))
        }
        "array" => {
            let data = typed
                .get_child("data")
                .ok_or_else(|| malformed("array without data"))?;
            data.children
                .iter()
                .filter_map(|n| n.as_element())
                .map(parse_value)
                .collect::<Result<Vec<_>, _>>()
                .map(XmlRpcValue::Array)
        }
        other => Err(malformed(&format!("unsupported type <{}>", other))),
    }
}

/// Parse a `<methodResponse>` document
///
/// A `<fault>` response becomes the matching [`SupervisorFault`].
pub fn parse_method_response(body: &[u8]) -> Result<XmlRpcValue, SupervisorFault> {
    let root = Element::parse(BufReader::new(body))
        .map_err(|e| malformed(&e.to_string()))?;

    if root.name != "methodResponse" {
        return Err(malformed(&format!("unexpected root <{}>", root.name)));
    }

    if let Some(fault) = root.get_child("fault") {
        let value = fault
            .get_child("value")
            .ok_or_else(|| malformed("fault without value"))?;
        let XmlRpcValue::Struct(members) = parse_value(value)? else {
            return Err(malformed("fault value is not a struct"));
        };

        let code = members
            .get("faultCode")
            .and_then(XmlRpcValue::as_i64)
            .ok_or_else(|| malformed("fault without faultCode"))?;
        let message = members
            .get("faultString")
            .and_then(XmlRpcValue::as_str)
            .unwrap_or_default()
            .to_string();

        return Err(SupervisorFault::from_code(code as i32, message));
    }

    let value = root
        .get_child("params")
        .and_then(|p| p.get_child("param"))
        .and_then(|p| p.get_child("value"))
        .ok_or_else(|| malformed("missing params"))?;

    parse_value(value)
}

fn process_info_from_value(value: XmlRpcValue) -> Result<ProcessInfo, SupervisorFault> {
    let XmlRpcValue::Struct(members) = value else {
        return Err(malformed("process info is not a struct"));
    };

    let state = members
        .get("state")
        .and_then(XmlRpcValue::as_i64)
        .ok_or_else(|| malformed("process info without state"))?;

    Ok(ProcessInfo {
        name: members
            .get("name")
            .and_then(XmlRpcValue::as_str)
            .unwrap_or_default()
            .to_string(),
        group: members
            .get("group")
            .and_then(XmlRpcValue::as_str)
            .unwrap_or_default()
            .to_string(),
        state: ProcessState::from_code(state),
        pid: members
            .get("pid")
            .and_then(XmlRpcValue::as_i64)
            .filter(|pid| *pid > 0),
    })
}

/// supervisord client over HTTP
pub struct XmlRpcSupervisor {
    client: reqwest::Client,
    endpoint: String,
}

impl XmlRpcSupervisor {
    pub fn new(config: &SupervisorConfig) -> Result<Self, SupervisorFault> {
        let client = reqwest::Client::builder()
            .timeout(secs_to_duration(config.timeout_secs))
            .build()
            .map_err(|e| SupervisorFault::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/RPC2", config.url.trim_end_matches('/')),
        })
    }

    async fn call(&self, method: &str, params: &[Param<'_>]) -> Result<XmlRpcValue, SupervisorFault> {
        let body = build_method_call(method, params)?;
        debug!(method, endpoint = %self.endpoint, "Supervisor call");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "text/xml")
            .body(body)
            .send()
            .await
            .map_err(|e| SupervisorFault::Transport(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| SupervisorFault::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(SupervisorFault::Transport(format!(
                "{} returned HTTP status {}",
                method, status
            )));
        }

        parse_method_response(&bytes)
    }
}

#[async_trait]
impl Supervisor for XmlRpcSupervisor {
    async fn start_process(&self, name: &str) -> Result<(), SupervisorFault> {
        self.call("supervisor.startProcess", &[Param::Str(name), Param::Bool(true)])
            .await
            .map(|_| ())
    }

    async fn stop_process(&self, name: &str) -> Result<(), SupervisorFault> {
        self.call("supervisor.stopProcess", &[Param::Str(name), Param::Bool(true)])
            .await
            .map(|_| ())
    }

    async fn get_process_info(&self, name: &str) -> Result<ProcessInfo, SupervisorFault> {
        let value = self
            .call("supervisor.getProcessInfo", &[Param::Str(name)])
            .await?;
        process_info_from_value(value)
    }

    async fn signal_process(&self, name: &str, signal: &str) -> Result<(), SupervisorFault> {
        self.call(
            "supervisor.signalProcess",
            &[Param::Str(name), Param::Str(signal)],
        )
        .await
        .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_start_process_call() {
        let xml = build_method_call(
            "supervisor.startProcess",
            &[Param::Str("station_1:station_1_backend"), Param::Bool(true)],
        )
        .unwrap();

        assert!(xml.contains("<methodName>supervisor.startProcess</methodName>"));
        assert!(xml.contains("<string>station_1:station_1_backend</string>"));
        assert!(xml.contains("<boolean>1</boolean>"));
    }

    #[test]
    fn test_parse_boolean_response() {
        let xml = br#"<?xml version="1.0"?>
<methodResponse>
  <params>
    <param><value><boolean>1</boolean></value></param>
  </params>
</methodResponse>"#;
        assert_eq!(parse_method_response(xml).unwrap(), XmlRpcValue::Bool(true));
    }

    #[test]
    fn test_parse_bad_name_fault() {
        let xml = br#"<?xml version="1.0"?>
<methodResponse>
  <fault>
    <value><struct>
      <member><name>faultCode</name><value><int>10</int></value></member>
      <member><name>faultString</name><value><string>BAD_NAME: station_9:station_9_backend</string></value></member>
    </struct></value>
  </fault>
</methodResponse>"#;
        assert_eq!(
            parse_method_response(xml),
            Err(SupervisorFault::BadName(
                "BAD_NAME: station_9:station_9_backend".to_string()
            ))
        );
    }

    #[test]
    fn test_parse_process_info() {
        let xml = br#"<?xml version="1.0"?>
<methodResponse>
  <params><param><value><struct>
    <member><name>name</name><value><string>station_1_backend</string></value></member>
    <member><name>group</name><value><string>station_1</string></value></member>
    <member><name>state</name><value><int>20</int></value></member>
    <member><name>statename</name><value><string>RUNNING</string></value></member>
    <member><name>pid</name><value><int>4242</int></value></member>
  </struct></value></param></params>
</methodResponse>"#;
        let info = process_info_from_value(parse_method_response(xml).unwrap()).unwrap();
        assert!(info.is_running());
        assert_eq!(info.group, "station_1");
        assert_eq!(info.pid, Some(4242));
    }

    #[test]
    fn test_untyped_value_is_string() {
        let xml = br#"<methodResponse><params><param><value>plain</value></param></params></methodResponse>"#;
        assert_eq!(
            parse_method_response(xml).unwrap(),
            XmlRpcValue::Str("plain".to_string())
        );
    }

    #[test]
    fn test_garbage_is_transport_fault() {
        assert!(matches!(
            parse_method_response(b"<html>502 Bad Gateway</html>"),
            Err(SupervisorFault::Transport(_))
        ));
    }

    #[test]
    fn test_endpoint_trailing_slash() {
        let supervisor = XmlRpcSupervisor::new(&SupervisorConfig {
            url: "http://127.0.0.1:9001/".to_string(),
            timeout_secs: 1.0,
        })
        .unwrap();
        assert_eq!(supervisor.endpoint, "http://127.0.0.1:9001/RPC2");
    }
}
