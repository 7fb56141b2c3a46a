use clipblob::{ClipboardBridge, Config, ConfigError, DispatchOutcome, Element as _, RequestKind};
use clipblob_testsuite::{bridge, FakeBlob, FakeEntry, FakeHost};
use rstest::rstest;

fn png() -> FakeBlob {
    FakeBlob::new("image/png", b"\x89PNG")
}

#[tokio::test]
async fn unrelated_clicks_are_ignored() {
    let host = FakeHost::new();
    let body = host.body_element();
    let plain = host.append(&body, "button", &[("class", "nav")]);
    let message_only = host.append(&body, "button", &[("data-done", "copied")]);

    let bridge = bridge(&host);

    assert_eq!(bridge.dispatch(plain.clone()).await, DispatchOutcome::Ignored);
    assert_eq!(bridge.dispatch(message_only).await, DispatchOutcome::Ignored);
    assert_eq!(bridge.dispatch(body).await, DispatchOutcome::Ignored);
    assert_eq!(plain.classes(), ["nav"]);
    assert_eq!(host.log(), "");
}

#[rstest]
#[case::invalid_syntax("#1bad")]
#[case::unsupported_character("img!")]
#[case::no_match("#missing")]
#[case::empty("")]
#[tokio::test]
async fn unusable_copy_selector_fails_silently(#[case] selector: &str) {
    let host = FakeHost::new();
    let body = host.body_element();
    host.append(&body, "img", &[("id", "pic"), ("src", "http://x/y.png")]);
    let button = host.append(&body, "button", &[("data-copyblob", selector)]);
    host.serve("http://x/y.png", png());

    let outcome = bridge(&host).dispatch(button.clone()).await;

    assert_eq!(outcome, DispatchOutcome::Failed(RequestKind::Copy));
    assert!(!button.has_class("done"));
    assert_eq!(host.count("fetch"), 0);
}

#[tokio::test]
async fn invalid_paste_selector_still_reads_clipboard() {
    let host = FakeHost::new();
    let body = host.body_element();
    let tray = host.append(&body, "div", &[("class", "tray")]);
    let button = host.append(&body, "button", &[("data-pasteblob", ".tray[")]);
    host.set_clipboard(vec![FakeEntry::new([png()])]);

    let outcome = bridge(&host).dispatch(button).await;

    // Without a container nothing is attached, but the read itself succeeded.
    assert_eq!(outcome, DispatchOutcome::Done(RequestKind::Paste));
    assert_eq!(host.count("read"), 1);
    assert!(tray.children().is_empty());
}

#[tokio::test]
async fn paste_attribute_wins_over_copy_attribute() {
    let host = FakeHost::new();
    let body = host.body_element();
    host.append(&body, "img", &[("id", "pic"), ("src", "http://x/y.png")]);
    let tray = host.append(&body, "div", &[("id", "tray")]);
    let button = host.append(&body, "button", &[("data-copyblob", "#pic"), ("data-pasteblob", "#tray")]);
    host.serve("http://x/y.png", png());
    host.set_clipboard(vec![FakeEntry::new([png()])]);

    let outcome = bridge(&host).dispatch(button).await;

    assert_eq!(outcome, DispatchOutcome::Done(RequestKind::Paste));
    assert_eq!(host.count("fetch"), 0);
    assert_eq!(tray.children().len(), 1);
}

#[tokio::test]
async fn default_message_is_set_once() {
    let host = FakeHost::new();
    let body = host.body_element();
    host.append(&body, "div", &[("class", "tray")]);
    let button = host.append(&body, "button", &[("data-pasteblob", ".tray")]);
    host.set_clipboard(vec![FakeEntry::new([png()])]);

    let bridge = bridge(&host);

    bridge.dispatch(button.clone()).await;
    assert_eq!(button.attribute("data-done").as_deref(), Some("pasted"));

    button.set_attribute("data-done", "pasted again?").unwrap();
    bridge.dispatch(button.clone()).await;
    assert_eq!(button.attribute("data-done").as_deref(), Some("pasted again?"));
}

#[tokio::test]
async fn explicit_message_is_kept() {
    let host = FakeHost::new();
    let body = host.body_element();
    host.append(&body, "img", &[("id", "pic"), ("src", "http://x/y.png")]);
    let button = host.append(
        &body,
        "button",
        &[("data-copyblob", "#pic"), ("data-done", "copy successful")],
    );
    host.serve("http://x/y.png", png());

    bridge(&host).dispatch(button.clone()).await;

    assert_eq!(button.attribute("data-done").as_deref(), Some("copy successful"));
}

#[tokio::test]
async fn done_class_pulses_on_every_success() {
    let host = FakeHost::new();
    let body = host.body_element();
    host.append(&body, "img", &[("id", "pic"), ("src", "http://x/y.png")]);
    let button = host.append(&body, "button", &[("data-copyblob", "#pic")]);
    host.serve("http://x/y.png", png());

    bridge(&host).initialize();

    host.click(&button);
    host.run_tasks().await;
    assert!(button.has_class("done"));
    assert_eq!(host.fire(&button, "animationend"), 1);
    assert!(!button.has_class("done"));

    host.click(&button);
    host.click(&button);
    host.run_tasks().await;
    assert_eq!(button.classes(), ["done"]);
    assert_eq!(button.pending_listeners("animationend"), 2);

    host.fire(&button, "animationend");
    assert!(!button.has_class("done"));
    assert_eq!(button.pending_listeners("animationend"), 0);
    assert_eq!(host.fire(&button, "animationend"), 0);
}

#[tokio::test]
async fn custom_configuration() {
    let host = FakeHost::new();
    let body = host.body_element();
    host.append(&body, "img", &[("id", "pic"), ("src", "http://x/y.png")]);
    let button = host.append(&body, "button", &[("data-grab", "#pic")]);
    host.serve("http://x/y.png", png());

    let mut config = Config::default();
    config.copy.attribute = "data-grab".to_owned();
    config.copy.active_class = "can-grab".to_owned();
    config.copy.done_message = "grabbed".to_owned();
    config.done_class = "flash".to_owned();
    config.done_attribute = "data-status".to_owned();

    let bridge = ClipboardBridge::new(host.clone(), config).unwrap();
    bridge.initialize();
    host.click(&button);
    host.run_tasks().await;

    assert!(body.has_class("can-grab"));
    assert!(!body.has_class("copyblobactive"));
    assert!(button.has_class("flash"));
    assert_eq!(button.attribute("data-status").as_deref(), Some("grabbed"));
    assert_eq!(button.attribute("data-done"), None);
}

#[test]
fn invalid_configuration_is_rejected() {
    let host = FakeHost::new();
    let config = Config {
        done_class: String::new(),
        ..Config::default()
    };

    let result = ClipboardBridge::new(host.clone(), config);

    assert_eq!(result.err(), Some(ConfigError::Empty { field: "doneClass" }));
    assert_eq!(host.click_listener_installs(), 0);
}
