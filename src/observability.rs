use biometrics::{Collector, Counter, Moments};

pub(crate) static CHAT_REQUESTS: Counter = Counter::new("custodian.chat.requests");
pub(crate) static CHAT_REQUEST_ERRORS: Counter = Counter::new("custodian.chat.request_errors");
pub(crate) static CHAT_REQUESTS_REFUSED: Counter = Counter::new("custodian.chat.requests_refused");

pub(crate) static STREAM_BYTES: Counter = Counter::new("custodian.stream.bytes");
pub(crate) static STREAM_PAYLOADS: Counter = Counter::new("custodian.stream.payloads");
pub(crate) static STREAM_RAW_PAYLOADS: Counter = Counter::new("custodian.stream.raw_payloads");
pub(crate) static STREAM_SENTINELS: Counter = Counter::new("custodian.stream.sentinels");
pub(crate) static STREAM_DISCARDED_BYTES: Counter =
    Counter::new("custodian.stream.discarded_bytes");
pub(crate) static STREAM_TTFB: Moments = Moments::new("custodian.stream.ttfb_seconds");
pub(crate) static STREAM_DURATION: Moments = Moments::new("custodian.stream.duration_seconds");

pub(crate) static EDITOR_KEYS_SUPPRESSED: Counter =
    Counter::new("custodian.editor.keys_suppressed");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CHAT_REQUESTS);
    collector.register_counter(&CHAT_REQUEST_ERRORS);
    collector.register_counter(&CHAT_REQUESTS_REFUSED);

    collector.register_counter(&STREAM_BYTES);
    collector.register_counter(&STREAM_PAYLOADS);
    collector.register_counter(&STREAM_RAW_PAYLOADS);
    collector.register_counter(&STREAM_SENTINELS);
    collector.register_counter(&STREAM_DISCARDED_BYTES);
    collector.register_moments(&STREAM_TTFB);
    collector.register_moments(&STREAM_DURATION);

    collector.register_counter(&EDITOR_KEYS_SUPPRESSED);
}
