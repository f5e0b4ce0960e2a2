//! Integration tests for the shutdown hook
//!
//! Signal registration is process-global, so every test serializes on a
//! shared guard and raises only signals it registered itself.

use crossbeam_channel::bounded;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use parking_lot::Mutex;
use service_kit::shutdown::ShutdownHook;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

static GUARD: Mutex<()> = Mutex::new(());

#[test]
fn test_close_blocks_until_signal_then_runs_callbacks_in_order() {
    let _guard = GUARD.lock();

    let hook = ShutdownHook::new()
        .unwrap()
        .with_signals([Signal::SIGUSR1])
        .unwrap();

    let (done_tx, done_rx) = bounded::<()>(1);
    let raiser = thread::spawn(move || {
        // close must still be blocked while no signal has arrived
        assert!(
            done_rx.recv_timeout(Duration::from_millis(200)).is_err(),
            "close returned before any signal"
        );
        kill(Pid::this(), Signal::SIGUSR1).unwrap();
        // and must unblock promptly once the signal lands
        done_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("close did not return after the signal");
    });

    let order = Arc::new(Mutex::new(Vec::new()));
    let callbacks: Vec<Box<dyn FnOnce()>> = vec![
        {
            let order = Arc::clone(&order);
            Box::new(move || order.lock().push(1))
        },
        {
            let order = Arc::clone(&order);
            Box::new(move || order.lock().push(2))
        },
        {
            let order = Arc::clone(&order);
            Box::new(move || order.lock().push(3))
        },
    ];

    hook.close(callbacks);
    done_tx.send(()).unwrap();
    raiser.join().unwrap();

    assert_eq!(*order.lock(), vec![1, 2, 3]);
}

#[test]
fn test_panicking_callback_aborts_remaining_sequence() {
    let _guard = GUARD.lock();

    let hook = ShutdownHook::new()
        .unwrap()
        .with_signals([Signal::SIGUSR2])
        .unwrap();

    let raiser = thread::spawn(|| {
        thread::sleep(Duration::from_millis(100));
        kill(Pid::this(), Signal::SIGUSR2).unwrap();
    });

    let ran = Arc::new(Mutex::new(Vec::new()));
    let first = {
        let ran = Arc::clone(&ran);
        Box::new(move || ran.lock().push("first")) as Box<dyn FnOnce()>
    };
    let second = Box::new(|| panic!("cleanup failed")) as Box<dyn FnOnce()>;
    let third = {
        let ran = Arc::clone(&ran);
        Box::new(move || ran.lock().push("third")) as Box<dyn FnOnce()>
    };

    let result = catch_unwind(AssertUnwindSafe(|| {
        hook.close(vec![first, second, third]);
    }));

    raiser.join().unwrap();
    assert!(result.is_err(), "callback panic must propagate out of close");
    assert_eq!(*ran.lock(), vec!["first"]);
}

#[test]
fn test_close_with_no_callbacks_returns_after_signal() {
    let _guard = GUARD.lock();

    let hook = ShutdownHook::new()
        .unwrap()
        .with_signals([Signal::SIGUSR1])
        .unwrap();

    let raiser = thread::spawn(|| {
        thread::sleep(Duration::from_millis(50));
        kill(Pid::this(), Signal::SIGUSR1).unwrap();
    });

    hook.close(Vec::new());
    raiser.join().unwrap();
}

#[test]
fn test_hook_is_usable_again_after_previous_close() {
    let _guard = GUARD.lock();

    for round in 0..2 {
        let hook = ShutdownHook::new()
            .unwrap()
            .with_signals([Signal::SIGUSR1])
            .unwrap();

        let raiser = thread::spawn(|| {
            thread::sleep(Duration::from_millis(50));
            kill(Pid::this(), Signal::SIGUSR1).unwrap();
        });

        let fired = Arc::new(Mutex::new(0));
        let counter = {
            let fired = Arc::clone(&fired);
            Box::new(move || *fired.lock() += 1) as Box<dyn FnOnce()>
        };

        hook.close(vec![counter]);
        raiser.join().unwrap();
        assert_eq!(*fired.lock(), 1, "round {}", round);
    }
}
