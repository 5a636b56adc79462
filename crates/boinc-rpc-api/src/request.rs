use std::fmt;

use quick_xml::escape::escape;

/// A single child of a request element.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Child {
    Field { name: String, value: String },
    Flag(String),
}

/// Outbound command body, placed inside the request envelope by the codec.
///
/// ```
/// use boinc_rpc_api::Request;
///
/// let req = Request::new("get_messages")
///     .field("seqno", 42)
///     .flag("translatable");
/// assert_eq!(
///     req.to_string(),
///     "<get_messages>\n<seqno>42</seqno>\n<translatable/>\n</get_messages>"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    tag: String,
    children: Vec<Child>,
}

impl Request {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            children: Vec::new(),
        }
    }

    /// Append `<name>value</name>`; the value is escaped.
    pub fn field(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.children.push(Child::Field {
            name: name.into(),
            value: value.to_string(),
        });
        self
    }

    /// Append the empty marker `<name/>`.
    pub fn flag(mut self, name: impl Into<String>) -> Self {
        self.children.push(Child::Flag(name.into()));
        self
    }

    /// Append the marker only when `on` is set.
    pub fn flag_if(self, name: impl Into<String>, on: bool) -> Self {
        if on { self.flag(name) } else { self }
    }

    /// Command tag, used for logging and reply lookup.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Whether this request belongs to the auth handshake and may bypass the gate.
    pub fn is_auth(&self) -> bool {
        matches!(self.tag.as_str(), "auth1" | "auth2")
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.children.is_empty() {
            return write!(f, "<{}/>", self.tag);
        }
        writeln!(f, "<{}>", self.tag)?;
        for child in &self.children {
            match child {
                Child::Field { name, value } => {
                    writeln!(f, "<{name}>{}</{name}>", escape(value.as_str()))?;
                }
                Child::Flag(name) => writeln!(f, "<{name}/>")?,
            }
        }
        write!(f, "</{}>", self.tag)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::Request;

    #[test]
    fn bare_command_is_self_closing() {
        assert_eq!(Request::new("auth1").to_string(), "<auth1/>");
        assert_eq!(Request::new("project_attach_poll").to_string(), "<project_attach_poll/>");
    }

    #[test]
    fn fields_are_escaped() {
        let req = Request::new("project_attach")
            .field("project_url", "https://example.org/?a=1&b=2")
            .field("authenticator", "k<ey>")
            .field("project_name", "");
        assert_eq!(
            req.to_string(),
            "<project_attach>\n\
             <project_url>https://example.org/?a=1&amp;b=2</project_url>\n\
             <authenticator>k&lt;ey&gt;</authenticator>\n\
             <project_name></project_name>\n\
             </project_attach>"
        );
    }

    #[test]
    fn conditional_flag() {
        assert_eq!(
            Request::new("get_results").flag_if("active_only", false).to_string(),
            "<get_results/>"
        );
        assert_eq!(
            Request::new("get_results").flag_if("active_only", true).to_string(),
            "<get_results>\n<active_only/>\n</get_results>"
        );
    }

    #[test]
    fn auth_requests_are_recognised() {
        assert!(Request::new("auth1").is_auth());
        assert!(Request::new("auth2").is_auth());
        assert!(!Request::new("get_state").is_auth());
    }
}
