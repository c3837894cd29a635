use std::sync::{Arc, Mutex};

use tern_core::{atom, AtomHandle, FnHandle, TernError, Value};

fn recording_watch(log: &Arc<Mutex<Vec<(String, Value, Value)>>>, tag: &str) -> FnHandle {
    let log = log.clone();
    let tag = tag.to_string();
    FnHandle::new(Some(format!("watch-{}", tag)), move |args| {
        let new = args.first().cloned().unwrap_or(Value::Nil);
        let old = args.get(1).cloned().unwrap_or(Value::Nil);
        log.lock().unwrap().push((tag.clone(), new, old));
        Ok(Value::Nil)
    })
}

#[test]
fn watchers_fire_in_registration_order_with_new_and_old() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let atom = AtomHandle::new("watch/order", Value::Number(1.0));
    atom.add_watch(Value::keyword("l1"), recording_watch(&log, "l1"));
    atom.add_watch(Value::keyword("l2"), recording_watch(&log, "l2"));
    atom.add_watch(Value::keyword("l3"), recording_watch(&log, "l3"));

    atom.reset(Value::Number(2.0)).unwrap();

    let entries = log.lock().unwrap().clone();
    assert_eq!(entries.len(), 3);
    for (idx, tag) in ["l1", "l2", "l3"].iter().enumerate() {
        let (got_tag, new, old) = &entries[idx];
        assert_eq!(got_tag, tag);
        assert_eq!(new, &Value::Number(2.0));
        assert_eq!(old, &Value::Number(1.0));
    }
}

#[test]
fn re_adding_a_watch_replaces_callback_in_place() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let atom = AtomHandle::new("watch/replace", Value::Nil);
    atom.add_watch(Value::keyword("a"), recording_watch(&log, "first"));
    atom.add_watch(Value::keyword("b"), recording_watch(&log, "b"));
    atom.add_watch(Value::keyword("a"), recording_watch(&log, "second"));

    atom.reset(Value::Bool(true)).unwrap();

    let tags: Vec<String> = log.lock().unwrap().iter().map(|e| e.0.clone()).collect();
    // the :a slot keeps its original position but runs the new callback
    assert_eq!(tags, vec!["second".to_string(), "b".to_string()]);
}

#[test]
fn remove_watch_stops_notification() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let atom = AtomHandle::new("watch/remove", Value::Nil);
    atom.add_watch(Value::keyword("a"), recording_watch(&log, "a"));
    assert!(atom.remove_watch(&Value::keyword("a")));
    assert!(!atom.remove_watch(&Value::keyword("a")));

    atom.reset(Value::Bool(true)).unwrap();
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn watch_errors_propagate_to_reset_caller() {
    let atom = AtomHandle::new("watch/error", Value::Nil);
    atom.add_watch(
        Value::keyword("boom"),
        FnHandle::new(None, |_| Err(TernError::message("watch failed"))),
    );
    let err = atom.reset(Value::Bool(true)).unwrap_err();
    assert_eq!(err, TernError::message("watch failed"));
    // the swap itself still happened before notification
    assert_eq!(atom.deref(), Value::Bool(true));
}

#[test]
fn registry_dereferences_latest_atom() {
    atom::register("app/state", Value::Number(1.0));
    let replaced = atom::register("app/state", Value::Number(10.0));
    assert_eq!(atom::deref_path("app/state"), Some(Value::Number(10.0)));

    replaced.reset(Value::Number(11.0)).unwrap();
    assert_eq!(atom::deref_path("app/state"), Some(Value::Number(11.0)));
    assert_eq!(atom::lookup("app/unknown"), None);
}

#[test]
fn resets_observed_in_issue_order() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let atom = AtomHandle::new("watch/sequence", Value::Number(0.0));
    {
        let seen = seen.clone();
        atom.add_watch(
            Value::keyword("trace"),
            FnHandle::new(None, move |args| {
                seen.lock().unwrap().push(args[0].clone());
                Ok(Value::Nil)
            }),
        );
    }
    for i in 1..=4 {
        atom.reset(Value::Number(i as f64)).unwrap();
    }
    let seen = seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![
            Value::Number(1.0),
            Value::Number(2.0),
            Value::Number(3.0),
            Value::Number(4.0)
        ]
    );
}
