//! Protocol-agnostic description of an outgoing request
//!
//! [`RequestInformation`] is built by generated client code and consumed by a
//! request adapter. The target URL is described by an RFC 6570 style template
//! (`{+baseurl}/users/{user%2Did}{?%24top,%24select}`) plus path and query
//! parameters, or by a raw URL stored under [`RAW_URL_KEY`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use regex::{Captures, Regex};
use url::Url;

use crate::headers::RequestHeaders;
use crate::options::RequestOption;
use crate::serialization::{Serializable, SerializationWriterFactory};
use crate::{CoreError, Result};

/// Path parameter holding a fully resolved URL that bypasses the template
pub const RAW_URL_KEY: &str = "request-raw-url";

/// Path parameter the adapter fills with its base URL
pub const BASE_URL_KEY: &str = "baseurl";

const CONTENT_TYPE_HEADER: &str = "Content-Type";
const BINARY_CONTENT_TYPE: &str = "application/octet-stream";

/// HTTP method of a request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Method {
    #[default]
    Get,
    Post,
    Patch,
    Delete,
    Options,
    Connect,
    Put,
    Trace,
    Head,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Connect => "CONNECT",
            Method::Put => "PUT",
            Method::Trace => "TRACE",
            Method::Head => "HEAD",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            "OPTIONS" => Ok(Method::Options),
            "CONNECT" => Ok(Method::Connect),
            "PUT" => Ok(Method::Put),
            "TRACE" => Ok(Method::Trace),
            "HEAD" => Ok(Method::Head),
            _ => Err(CoreError::invalid_argument(
                "http_method",
                format!("Unsupported HTTP method: {}", s),
            )),
        }
    }
}

/// Everything a request adapter needs to issue one request
#[derive(Debug, Clone, Default)]
pub struct RequestInformation {
    pub http_method: Method,
    pub url_template: String,
    pub path_parameters: HashMap<String, String>,
    pub query_parameters: HashMap<String, String>,
    pub headers: RequestHeaders,
    pub content: Option<Vec<u8>>,
    options: HashMap<&'static str, Arc<dyn RequestOption>>,
}

impl RequestInformation {
    pub fn new(
        http_method: Method,
        url_template: impl Into<String>,
        path_parameters: HashMap<String, String>,
    ) -> Self {
        Self {
            http_method,
            url_template: url_template.into(),
            path_parameters,
            ..Default::default()
        }
    }

    /// Resolve the target URL, from the raw URL parameter when present,
    /// otherwise by expanding the template.
    pub fn url(&self) -> Result<Url> {
        if let Some(raw) = self.path_parameters.get(RAW_URL_KEY) {
            return Url::parse(raw).map_err(|e| {
                CoreError::invalid_argument(RAW_URL_KEY, format!("Invalid URL {}: {}", raw, e))
            });
        }

        if self.url_template.trim().is_empty() {
            return Err(CoreError::invalid_argument(
                "url_template",
                "the request has neither a URL template nor a raw URL",
            ));
        }

        let expanded =
            expand_uri_template(&self.url_template, &self.path_parameters, &self.query_parameters);
        Url::parse(&expanded).map_err(|e| {
            CoreError::invalid_argument("url_template", format!("Invalid URL {}: {}", expanded, e))
        })
    }

    /// Point the request at a fully resolved URL; template parameters are dropped.
    pub fn set_url(&mut self, url: &str) {
        self.query_parameters.clear();
        self.path_parameters.clear();
        self.path_parameters
            .insert(RAW_URL_KEY.to_string(), url.to_string());
    }

    pub fn add_request_options<I>(&mut self, options: I)
    where
        I: IntoIterator<Item = Arc<dyn RequestOption>>,
    {
        for option in options {
            self.options.insert(option.key(), option);
        }
    }

    pub fn remove_request_options(&mut self, keys: &[&str]) {
        self.options.retain(|key, _| !keys.contains(key));
    }

    /// Typed lookup of an attached option
    pub fn get_request_option<T: RequestOption>(&self) -> Option<&T> {
        self.options
            .values()
            .find_map(|option| option.as_any().downcast_ref::<T>())
    }

    pub fn request_options(&self) -> impl Iterator<Item = &Arc<dyn RequestOption>> {
        self.options.values()
    }

    /// Serialize `value` with a writer for `content_type` and use it as the body
    pub fn set_content_from_parsable(
        &mut self,
        factory: &dyn SerializationWriterFactory,
        content_type: &str,
        value: &dyn Serializable,
    ) -> Result<()> {
        if content_type.trim().is_empty() {
            return Err(CoreError::invalid_argument("content_type", "cannot be empty"));
        }
        let mut writer = factory.get_serialization_writer(content_type)?;
        writer.write_object_value(None, Some(value))?;
        self.content = Some(writer.get_serialized_content()?);
        self.headers.try_add(CONTENT_TYPE_HEADER, content_type);
        Ok(())
    }

    /// Use raw bytes as the body
    pub fn set_stream_content(&mut self, content: Vec<u8>) {
        self.content = Some(content);
        self.headers.try_add(CONTENT_TYPE_HEADER, BINARY_CONTENT_TYPE);
    }
}

fn template_expression() -> &'static Regex {
    static EXPRESSION: OnceLock<Regex> = OnceLock::new();
    EXPRESSION.get_or_init(|| Regex::new(r"\{([+?&]?)([^}]+)\}").expect("Valid regex pattern"))
}

/// Expand the template subset used by generated clients:
/// `{var}` (percent-encoded), `{+var}` (reserved, copied verbatim),
/// `{?a,b}` form-style query and `{&a,b}` query continuation.
/// Unset variables expand to nothing.
pub fn expand_uri_template(
    template: &str,
    path_parameters: &HashMap<String, String>,
    query_parameters: &HashMap<String, String>,
) -> String {
    template_expression()
        .replace_all(template, |caps: &Captures| {
            let operator = &caps[1];
            let names = caps[2].split(',').map(str::trim);
            match operator {
                "+" => names
                    .filter_map(|name| path_parameters.get(name))
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(","),
                "?" | "&" => {
                    let pairs: Vec<String> = names
                        .filter_map(|name| {
                            query_parameters
                                .get(name)
                                .or_else(|| path_parameters.get(name))
                                .map(|value| format!("{}={}", name, urlencoding::encode(value)))
                        })
                        .collect();
                    if pairs.is_empty() {
                        String::new()
                    } else {
                        format!("{}{}", operator, pairs.join("&"))
                    }
                }
                _ => names
                    .filter_map(|name| path_parameters.get(name))
                    .map(|value| urlencoding::encode(value).into_owned())
                    .collect::<Vec<_>>()
                    .join(","),
            }
        })
        .into_owned()
}
