use crate::error::Result;
use crate::link::{require_next, Link, LinkRef, LinkStream};
use crate::operation::{Method, Operation};

/// Overrides the operation method and delegates.
#[derive(Debug, Clone, Copy)]
pub struct SetMethod {
    method: Method,
}

impl SetMethod {
    pub fn new(method: Method) -> Self {
        Self { method }
    }
}

impl Link for SetMethod {
    fn name(&self) -> &'static str {
        "set_method"
    }

    fn request(&self, operation: Operation, next: Option<LinkRef>) -> Result<LinkStream> {
        let next = require_next(self.name(), next)?;
        next.request(operation.with_method(self.method), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LinkError;
    use crate::link::from_fn;
    use futures::{stream, StreamExt};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn method_echo() -> LinkRef {
        Arc::new(from_fn("echo", |op: Operation, _next| {
            let method = op.method.map(|m| m.as_str()).unwrap_or("none");
            Ok(stream::iter(vec![Ok(Value::String(method.to_string()))]).boxed())
        }))
    }

    #[tokio::test]
    async fn test_sets_method() {
        let link = SetMethod::new("get".parse().unwrap());
        let values: Vec<_> = link
            .request(Operation::new("testpath"), Some(method_echo()))
            .unwrap()
            .collect()
            .await;

        assert_eq!(values[0].as_ref().unwrap(), &json!("GET"));
    }

    #[tokio::test]
    async fn test_overrides_prior_method() {
        let link = SetMethod::new(Method::Get);
        let op = Operation::new("testpath").with_method(Method::Delete);
        let values: Vec<_> = link
            .request(op, Some(method_echo()))
            .unwrap()
            .collect()
            .await;

        assert_eq!(values[0].as_ref().unwrap(), &json!("GET"));
    }

    #[test]
    fn test_requires_next() {
        let err = SetMethod::new(Method::Get)
            .request(Operation::new("testpath"), None)
            .err()
            .unwrap();
        assert!(matches!(err, LinkError::MissingNext { link: "set_method" }));
    }
}
