use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use taglog::{
    Config, FnPlugin, Level, Logger, ManualClock, Message, PrefixPreprocessor, Timings,
    filter::{DirectiveFilter, LevelFilter},
    fmt::{ConsoleTransport, Symbols, Target, WriteStyle},
    payload,
};

type Seen = Arc<Mutex<Vec<Message>>>;

fn recorder() -> (Seen, FnPlugin) {
    let seen = Seen::default();
    let sink = Arc::clone(&seen);
    let plugin = FnPlugin::new().with_transport(move |message| {
        sink.lock().push(message.clone());
        Ok(())
    });
    (seen, plugin)
}

fn diffs(message: &Message) -> (Vec<i64>, Vec<i64>) {
    (
        message.namespace.iter().map(|segment| segment.diff).collect(),
        message.tags.iter().map(|tag| tag.diff).collect(),
    )
}

#[test]
fn first_diff_is_zero_and_second_is_elapsed_time() {
    let (seen, plugin) = recorder();
    let logger = Logger::new(Config::new().plugin(plugin));

    logger.log("a:b + t").emit_at(1_000, payload!["one"]).unwrap();
    logger.log("a:b + t").emit_at(1_250, payload!["two"]).unwrap();

    let seen = seen.lock();
    assert_eq!(diffs(&seen[0]), (vec![0, 0], vec![0]));
    assert_eq!(diffs(&seen[1]), (vec![250, 250], vec![250]));
}

#[test]
fn prefixes_are_timed_independently() {
    let (seen, plugin) = recorder();
    let clock = Arc::new(ManualClock::new(0));
    let logger = Logger::builder().plugin(plugin).clock(Arc::clone(&clock)).build();

    logger.log("foo:bar").emit(vec![]).unwrap();
    clock.advance(10);
    logger.log("foo:baz").emit(vec![]).unwrap();
    clock.advance(10);
    logger.log("foo:bar").emit(vec![]).unwrap();

    let seen = seen.lock();
    assert_eq!(diffs(&seen[1]).0, vec![10, 0]);
    assert_eq!(diffs(&seen[2]).0, vec![10, 20]);
}

#[test]
fn every_filter_must_pass() {
    for level in Level::ALL {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let (seen, plugin) = recorder();
        let logger = Logger::builder()
            .plugin(FnPlugin::new().with_filter(|_| Ok(false)))
            .plugin(FnPlugin::new().with_filter(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            }))
            .plugin(plugin)
            .build();

        logger.at(level, "a").emit(payload!["x"]).unwrap();

        assert!(seen.lock().is_empty(), "{level}");
        assert_eq!(calls.load(Ordering::SeqCst), 0, "{level}");
    }
}

#[test]
fn every_filter_must_pass_in_any_order() {
    for level in Level::ALL {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let (seen, plugin) = recorder();
        let logger = Logger::builder()
            .plugin(FnPlugin::new().with_filter(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            }))
            .plugin(FnPlugin::new().with_filter(|_| Ok(false)))
            .plugin(plugin)
            .build();

        logger.at(level, "a").emit(payload!["x"]).unwrap();

        assert!(seen.lock().is_empty(), "{level}");
        assert_eq!(calls.load(Ordering::SeqCst), 1, "{level}");
    }
}

#[test]
fn preprocessors_chain() {
    let (seen, plugin) = recorder();
    let logger = Logger::builder()
        .plugin(PrefixPreprocessor::new(["outer"]))
        .plugin(PrefixPreprocessor::new(["inner"]))
        .plugin(plugin)
        .build();

    logger.ok("").emit(vec![]).unwrap();

    let seen = seen.lock();
    let ids = seen[0].namespace.iter().map(|segment| segment.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, vec![":inner", ":inner:outer"]);
}

#[test]
fn level_filter_boundary_at_error() {
    let (seen, plugin) = recorder();
    let logger = Logger::builder().plugin(LevelFilter::new(Level::Error)).plugin(plugin).build();

    for level in Level::ALL {
        logger.at(level, "a").emit(vec![]).unwrap();
    }

    let levels = seen.lock().iter().map(|message| message.level).collect::<Vec<_>>();
    assert_eq!(levels, vec![Level::Apocalypse, Level::Disaster, Level::Crash, Level::Error]);
}

#[test]
fn filtered_messages_still_update_timings() {
    let (seen, plugin) = recorder();
    let logger = Logger::builder().plugin(LevelFilter::new(Level::Error)).plugin(plugin).build();

    logger.trace("a").emit_at(0, vec![]).unwrap();
    logger.error("a").emit_at(100, vec![]).unwrap();

    assert_eq!(diffs(&seen.lock()[0]).0, vec![100]);
}

#[test]
fn shared_timing_store() {
    let timings = Timings::new();
    let (seen, plugin) = recorder();
    let first = Logger::with_timings(Config::default(), timings.clone());
    let second = Logger::with_timings(Config::new().plugin(plugin), timings.clone());

    first.log("a + t").emit_at(0, vec![]).unwrap();
    second.log("a + t").emit_at(40, vec![]).unwrap();

    assert_eq!(diffs(&seen.lock()[0]), (vec![40], vec![40]));
    assert_eq!(timings.last_seen(":a"), Some(40));

    let unrelated = Logger::new(Config::default());
    assert!(!unrelated.timings().ptr_eq(&timings));
}

#[test]
fn markers() {
    let (seen, plugin) = recorder();
    let logger = Logger::new(Config::new().plugin(plugin));

    logger.log("a:b + y, x").emit(vec![]).unwrap();
    logger.log("a:b").emit(vec![]).unwrap();
    logger.log("+ x").emit(vec![]).unwrap();

    let markers = seen.lock().iter().map(Message::marker).collect::<Vec<_>>();
    assert_eq!(markers, vec![":a:b +x, y", ":a:b", "+x"]);
}

#[test]
fn errors_stop_the_current_stage() {
    let (seen, plugin) = recorder();
    let logger = Logger::builder()
        .plugin(FnPlugin::new().with_transport(|_| Err(anyhow::anyhow!("broken pipe"))))
        .plugin(plugin)
        .build();

    let err = logger.crash("a").emit(vec![]).unwrap_err();
    assert_eq!(err.to_string(), "broken pipe");
    assert!(seen.lock().is_empty());
}

#[derive(Clone, Default)]
struct Buffer(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn directives_and_console_end_to_end() {
    let buffer = Buffer::default();
    let logger = Logger::builder()
        .plugin(PrefixPreprocessor::new(["demo"]))
        .plugin(DirectiveFilter::parse("warning,demo:db:*=trace,-demo:db:pool"))
        .plugin(
            ConsoleTransport::builder()
                .target(Target::Pipe(Box::new(buffer.clone())))
                .write_style(WriteStyle::Never)
                .symbols(Symbols::Letters)
                .build(),
        )
        .build();

    logger.trace("db + slow").emit_at(0, payload!["query took %dms", 12]).unwrap();
    logger.trace("db:pool").emit_at(10, payload!["hidden"]).unwrap();
    logger.trace("cache").emit_at(20, payload!["hidden"]).unwrap();
    logger.error("db + slow").emit_at(1_250, payload!["again"]).unwrap();

    let output = String::from_utf8(buffer.0.lock().clone()).unwrap();
    assert_eq!(
        output,
        "T slow \u{E0B0} demo \u{E0B0} db \u{E0B0} query took 12ms\n\
         E slow +1s \u{E0B0} demo +1s \u{E0B0} db +1s \u{E0B0} again\n"
    );
}
