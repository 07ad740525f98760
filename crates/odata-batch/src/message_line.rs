//! First line of an embedded HTTP message.

use core::{fmt, str::FromStr};

use crate::error::FormatError;

pub const HTTP_VERSION: &str = "HTTP/1.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Merge,
    Delete,
}

impl HttpMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Merge => "MERGE",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Queries may not appear inside a changeset.
    #[must_use]
    pub fn is_query(self) -> bool {
        self == HttpMethod::Get
    }
}

impl FromStr for HttpMethod {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "PATCH" => HttpMethod::Patch,
            "MERGE" => HttpMethod::Merge,
            "DELETE" => HttpMethod::Delete,
            _ => return Err(FormatError::InvalidHttpMethod(s.to_string())),
        })
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `METHOD SP URL SP HTTP/1.1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: HttpMethod,
    pub url: String,
}

/// `HTTP/1.1 SP status-code SP reason-phrase`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub status_code: u16,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLine {
    Request(RequestLine),
    Response(StatusLine),
}

impl MessageLine {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            MessageLine::Request(_) => "request",
            MessageLine::Response(_) => "response",
        }
    }
}

pub fn parse_request_line(line: &str, in_changeset: bool) -> Result<RequestLine, FormatError> {
    let segments: Vec<&str> = line.split(' ').collect();
    let &[method, url, version] = segments.as_slice() else {
        return Err(FormatError::InvalidRequestLine(line.to_string()));
    };
    if url.is_empty() {
        return Err(FormatError::InvalidRequestLine(line.to_string()));
    }
    let method: HttpMethod = method.parse()?;
    if version != HTTP_VERSION {
        return Err(FormatError::UnsupportedHttpVersion(version.to_string()));
    }
    if in_changeset && method.is_query() {
        return Err(FormatError::MethodNotAllowedInChangeSet(method.to_string()));
    }
    Ok(RequestLine {
        method,
        url: url.to_string(),
    })
}

pub fn parse_status_line(line: &str) -> Result<StatusLine, FormatError> {
    let invalid = || FormatError::InvalidResponseLine(line.to_string());
    let (version, rest) = line.split_once(' ').ok_or_else(invalid)?;
    let (code, reason) = rest.split_once(' ').ok_or_else(invalid)?;
    if version.is_empty() || code.is_empty() || reason.is_empty() {
        return Err(invalid());
    }
    if version != HTTP_VERSION {
        return Err(FormatError::UnsupportedHttpVersion(version.to_string()));
    }
    let status_code = code
        .parse()
        .map_err(|_| FormatError::InvalidStatusCode(code.to_string()))?;
    Ok(StatusLine {
        status_code,
        reason: reason.to_string(),
    })
}
