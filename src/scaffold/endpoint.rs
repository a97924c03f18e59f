//! Endpoint description for the generator

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::storage::FsError;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Invalid {kind} '{value}': must be a JavaScript identifier")]
    InvalidIdentifier { kind: &'static str, value: String },

    #[error("Invalid route '{0}': must start with '/'")]
    InvalidRoute(String),

    #[error("Unknown HTTP method '{0}' (expected GET, POST, PUT, PATCH or DELETE)")]
    UnknownMethod(String),

    #[error("Deployment template not found: {0}")]
    TemplateMissing(PathBuf),

    #[error("Entry file not found: {0}")]
    EntryMissing(PathBuf),

    #[error(transparent)]
    Fs(#[from] FsError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Upper-case form used in the SAM template
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Express router method name
    pub fn router_fn(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
        }
    }

    /// Status code of the generated stub response
    pub fn success_status(&self) -> u16 {
        match self {
            HttpMethod::Post => 201,
            _ => 200,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(GenerateError::UnknownMethod(s.to_string())),
        }
    }
}

/// One endpoint to scaffold: `<method> <route>` served by `<service>Controller.<function>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointSpec {
    pub service: String,
    pub function: String,
    pub method: HttpMethod,
    pub route: String,
}

impl EndpointSpec {
    /// Validates the parts; `route` defaults to `/<service>`
    pub fn new(
        service: &str,
        function: &str,
        method: &str,
        route: Option<&str>,
    ) -> Result<Self, GenerateError> {
        check_identifier("service name", service)?;
        check_identifier("function name", function)?;
        let method = method.parse()?;

        let route = match route {
            Some(r) if !r.starts_with('/') => return Err(GenerateError::InvalidRoute(r.to_string())),
            Some(r) => r.to_string(),
            None => format!("/{}", service),
        };

        Ok(Self {
            service: service.to_string(),
            function: function.to_string(),
            method,
            route,
        })
    }

    /// Route path inside the service router (the `/<service>` mount prefix removed)
    pub fn router_path(&self) -> String {
        let base = format!("/{}", self.service);
        match self.route.strip_prefix(&base) {
            Some("") => "/".to_string(),
            Some(rest) if rest.starts_with('/') => rest.to_string(),
            _ => self.route.clone(),
        }
    }

    pub fn controller_name(&self) -> String {
        format!("{}Controller", self.service)
    }

    pub fn routes_name(&self) -> String {
        format!("{}Routes", self.service)
    }

    pub fn handler_module(&self) -> String {
        format!("{}Handler", self.service)
    }

    /// Exported Lambda handler function
    pub fn handler_fn(&self) -> String {
        format!("{}Handler", self.function)
    }

    /// Logical id of the function in the SAM template
    pub fn lambda_name(&self) -> String {
        format!("{}Function", pascal_case(&self.function))
    }

    /// Event name in the SAM template
    pub fn event_name(&self) -> String {
        pascal_case(&self.function)
    }
}

fn check_identifier(kind: &'static str, value: &str) -> Result<(), GenerateError> {
    let mut chars = value.chars();
    let valid_start = chars
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        .unwrap_or(false);
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');

    if valid_start && valid_rest {
        Ok(())
    } else {
        Err(GenerateError::InvalidIdentifier {
            kind,
            value: value.to_string(),
        })
    }
}

fn pascal_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
