use crate::{Message, Plugin, selector::segments_under};

/// A preprocessor that nests every message under a fixed namespace prefix.
///
/// The message's own segments are rebuilt under the last prefix segment, so their ids (and
/// therefore their timing diffs) include the prefix:
///
/// ```
/// use taglog::{Level, Message, Plugin, PrefixPreprocessor, Selector};
///
/// let prefix = PrefixPreprocessor::new(["demo"]);
/// let message = Message {
///     time: 0,
///     level: Level::Log,
///     namespace: Selector::parse("foo:bar").namespace(),
///     tags: vec![],
///     payload: vec![],
/// };
/// let message = prefix.preprocess(&message).unwrap().unwrap();
/// assert_eq!(message.path(), "demo:foo:bar");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixPreprocessor {
    prefix: Vec<String>,
}

impl PrefixPreprocessor {
    pub fn new<I>(prefix: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            prefix: prefix.into_iter().map(Into::into).collect(),
        }
    }

    pub fn prefix(&self) -> &[String] {
        &self.prefix
    }
}

impl Plugin for PrefixPreprocessor {
    fn preprocess(&self, message: &Message) -> anyhow::Result<Option<Message>> {
        if self.prefix.is_empty() {
            return Ok(None);
        }

        let mut namespace = segments_under("", &self.prefix);
        let root = namespace.last().map(|segment| segment.id.clone()).unwrap_or_default();
        namespace.extend(segments_under(
            &root,
            message.namespace.iter().map(|segment| segment.name.as_str()),
        ));

        Ok(Some(Message {
            time: message.time,
            level: message.level,
            namespace,
            tags: message.tags.clone(),
            payload: message.payload.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{Level, Selector, Value};

    fn message(raw: &str) -> Message {
        let selector = Selector::parse(raw);
        Message {
            time: 5,
            level: Level::Ok,
            namespace: selector.namespace(),
            tags: selector.tags(),
            payload: vec!["x".into()],
        }
    }

    fn ids(message: &Message) -> Vec<&str> {
        message.namespace.iter().map(|segment| segment.id.as_str()).collect()
    }

    #[test]
    fn re_roots_segments() {
        let prefix = PrefixPreprocessor::new(["demo", "app"]);
        let out = prefix.preprocess(&message("foo:bar + t")).unwrap().unwrap();
        assert_eq!(ids(&out), vec![":demo", ":demo:app", ":demo:app:foo", ":demo:app:foo:bar"]);
        assert_eq!(out.tags, message("foo:bar + t").tags);
        assert_eq!(out.payload, vec![Value::from("x")]);
        assert_eq!(out.time, 5);
    }

    #[test]
    fn empty_namespace_gets_the_prefix() {
        let prefix = PrefixPreprocessor::new(["demo"]);
        let out = prefix.preprocess(&message("")).unwrap().unwrap();
        assert_eq!(ids(&out), vec![":demo"]);
    }

    #[test]
    fn empty_prefix_is_a_no_op() {
        let prefix = PrefixPreprocessor::new(Vec::<String>::new());
        assert_eq!(prefix.preprocess(&message("a:b")).unwrap(), None);
    }
}
