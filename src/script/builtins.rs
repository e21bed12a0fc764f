use std::fmt;

/// HTTP methods accepted by the `httpClient` built-in. Both spellings are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Delete,
    Head,
    Options,
    Post,
    Put,
    Patch,
    Purge,
    Link,
    Unlink,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 10] = [
        HttpMethod::Get,
        HttpMethod::Delete,
        HttpMethod::Head,
        HttpMethod::Options,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Purge,
        HttpMethod::Link,
        HttpMethod::Unlink,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Delete => "delete",
            HttpMethod::Head => "head",
            HttpMethod::Options => "options",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Purge => "purge",
            HttpMethod::Link => "link",
            HttpMethod::Unlink => "unlink",
        }
    }

    /// Parses either the lowercase or the uppercase spelling, nothing in between.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == name || m.as_str().to_ascii_uppercase() == name)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names of the interfaces the built-ins refer to.
pub const GLOBAL_MAP: &str = "GlobalMap";
pub const PARAM_MAP: &str = "ParamMap";

/// Ambient declarations of the platform built-ins available to every task script.
pub fn declarations() -> String {
    let methods = HttpMethod::ALL
        .iter()
        .flat_map(|m| [m.as_str().to_string(), m.as_str().to_ascii_uppercase()])
        .map(|m| format!("'{}'", m))
        .collect::<Vec<_>>()
        .join(" | ");

    format!(
        r#"type HttpMethod = {methods};

interface HttpRequest {{
  url: string;
  payload?: any;
  headers: Record<string, string>;
  method: HttpMethod;
  queryParams?: Record<string, any>;
}}

type HttpResult = {{ success: true; data: any }} | {{ success: false; error: any }};

declare function getWorkflowGlobal(): {GLOBAL_MAP};
declare function getWorkflowParams(): {PARAM_MAP};
declare function getWorkflowResults(): Record<string, any>;
declare function logger(...args: any[]): void;
declare function httpClient(params: HttpRequest): Promise<HttpResult>;
declare function getHttpClient(): typeof httpClient;
"#
    )
}
