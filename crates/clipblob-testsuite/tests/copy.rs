use clipblob::{ClipboardEntry as _, DispatchOutcome, Element as _, RequestKind};
use clipblob_testsuite::{bridge, FakeBlob, FakeHost};
use expect_test::expect;

#[tokio::test]
async fn copies_image_source_with_explicit_empty_message() {
    let host = FakeHost::new();
    let body = host.body_element();
    host.append(&body, "img", &[("id", "pic"), ("src", "http://x/y.png")]);
    let button = host.append(&body, "button", &[("data-copyblob", "#pic"), ("data-done", "")]);
    host.serve("http://x/y.png", FakeBlob::new("image/png", &[0x89, 0x50, 0x4e, 0x47]));

    bridge(&host).initialize();
    host.click(&button);
    host.run_tasks().await;

    expect![[r#"
        fetch http://x/y.png
        write [image/png (4 bytes)]"#]]
    .assert_eq(&host.log());

    let clipboard = host.clipboard();
    assert_eq!(clipboard.len(), 1);
    assert_eq!(clipboard[0].types(), ["image/png"]);
    assert_eq!(
        clipboard[0].get_type("image/png").await.unwrap(),
        FakeBlob::new("image/png", &[0x89, 0x50, 0x4e, 0x47])
    );

    // Present but empty: the default message is not injected.
    assert_eq!(button.attribute("data-done").as_deref(), Some(""));

    assert!(button.has_class("done"));
    assert_eq!(host.fire(&button, "animationend"), 1);
    assert!(!button.has_class("done"));
}

#[tokio::test]
async fn falls_back_to_href() {
    let host = FakeHost::new();
    let body = host.body_element();
    host.append(&body, "a", &[("id", "download"), ("href", "http://x/chart.png")]);
    let button = host.append(&body, "button", &[("data-copyblob", "a#download")]);
    host.serve("http://x/chart.png", FakeBlob::new("image/png", b"chart"));

    let outcome = bridge(&host).dispatch(button.clone()).await;

    assert_eq!(outcome, DispatchOutcome::Done(RequestKind::Copy));
    assert_eq!(button.attribute("data-done").as_deref(), Some("copied"));
    expect![[r#"
        fetch http://x/chart.png
        write [image/png (5 bytes)]"#]]
    .assert_eq(&host.log());
}

#[tokio::test]
async fn src_wins_over_href() {
    let host = FakeHost::new();
    let body = host.body_element();
    let select = host.append(
        &body,
        "img",
        &[("src", "http://x/full.png"), ("href", "http://x/thumb.png")],
    );
    host.serve("http://x/full.png", FakeBlob::new("image/png", b"full"));

    assert!(bridge(&host).copy(Some(&select)).await);
    assert_eq!(host.log(), "fetch http://x/full.png\nwrite [image/png (4 bytes)]");
}

#[tokio::test]
async fn target_without_resource_is_a_silent_failure() {
    let host = FakeHost::new();
    let body = host.body_element();
    host.append(&body, "div", &[("id", "plain"), ("src", "")]);
    let button = host.append(&body, "button", &[("data-copyblob", "#plain")]);

    bridge(&host).initialize();
    host.click(&button);
    host.run_tasks().await;

    assert!(!button.has_class("done"));
    assert_eq!(button.attribute("data-done"), None);
    assert_eq!(button.pending_listeners("animationend"), 0);
    assert_eq!(host.log(), "");
}

#[tokio::test]
async fn absent_target_is_a_failure() {
    let host = FakeHost::new();

    assert!(!bridge(&host).copy(None).await);
    assert_eq!(host.log(), "");
}

#[tokio::test]
async fn fetch_failure_is_a_failure() {
    let host = FakeHost::new();
    let body = host.body_element();
    host.append(&body, "img", &[("id", "pic"), ("src", "http://x/gone.png")]);
    let button = host.append(&body, "button", &[("data-copyblob", "#pic")]);
    host.fail_fetch("http://x/gone.png", "network error");

    let outcome = bridge(&host).dispatch(button.clone()).await;

    assert_eq!(outcome, DispatchOutcome::Failed(RequestKind::Copy));
    assert_eq!(host.count("write"), 0);
    assert!(!button.has_class("done"));
}

#[tokio::test]
async fn denied_write_is_a_failure() {
    let host = FakeHost::new();
    let body = host.body_element();
    host.append(&body, "img", &[("id", "pic"), ("src", "http://x/y.png")]);
    let button = host.append(&body, "button", &[("data-copyblob", "#pic")]);
    host.serve("http://x/y.png", FakeBlob::new("image/png", b"png"));
    host.deny_clipboard_write("NotAllowedError: Write permission denied.");

    let outcome = bridge(&host).dispatch(button.clone()).await;

    assert_eq!(outcome, DispatchOutcome::Failed(RequestKind::Copy));
    assert!(host.clipboard().is_empty());
    assert_eq!(button.attribute("data-done"), None);
}

#[tokio::test]
async fn unsupported_type_is_a_failure() {
    let host = FakeHost::new();
    let body = host.body_element();
    host.append(&body, "img", &[("id", "photo"), ("src", "http://x/photo.jpg")]);
    let button = host.append(&body, "button", &[("data-copyblob", "#photo")]);
    host.serve("http://x/photo.jpg", FakeBlob::new("image/jpeg", b"jpeg"));

    let outcome = bridge(&host).dispatch(button).await;

    assert_eq!(outcome, DispatchOutcome::Failed(RequestKind::Copy));
    assert!(host.clipboard().is_empty());
}

#[tokio::test]
async fn interleaved_copies_both_complete_and_last_write_wins() {
    let host = FakeHost::new();
    let body = host.body_element();
    host.append(&body, "img", &[("id", "a"), ("src", "http://x/a.png")]);
    host.append(&body, "img", &[("id", "b"), ("src", "http://x/b.png")]);
    let first = host.append(&body, "button", &[("data-copyblob", "#a")]);
    let second = host.append(&body, "button", &[("data-copyblob", "#b")]);
    host.serve("http://x/a.png", FakeBlob::new("image/png", b"a"));
    host.serve("http://x/b.png", FakeBlob::new("image/png", b"bb"));
    host.suspend_fetches();

    bridge(&host).initialize();
    host.click(&first);
    host.click(&second);
    host.run_tasks().await;

    // Both fetches are in flight before either write happens.
    expect![[r#"
        fetch http://x/a.png
        fetch http://x/b.png
        write [image/png (1 bytes)]
        write [image/png (2 bytes)]"#]]
    .assert_eq(&host.log());

    assert!(first.has_class("done"));
    assert!(second.has_class("done"));

    let clipboard = host.clipboard();
    assert_eq!(clipboard.len(), 1);
    assert_eq!(
        clipboard[0].get_type("image/png").await.unwrap(),
        FakeBlob::new("image/png", b"bb")
    );
}
