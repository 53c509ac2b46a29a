use super::*;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn graph() -> JobGraph {
    JobGraph::new(2).unwrap()
}

#[test]
fn spawn_and_complete() {
    let g = graph();
    let h = g.spawn(|| 21 * 2);
    assert_eq!(h.complete(), Ok(42));
}

#[test]
fn dependents_run_after_their_inputs() {
    let g = graph();
    let order = Arc::new(std::sync::Mutex::new(Vec::new()));
    let a = {
        let order = Arc::clone(&order);
        g.spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            order.lock().unwrap().push("a");
            3
        })
    };
    let b = {
        let order = Arc::clone(&order);
        g.spawn(move || {
            order.lock().unwrap().push("b");
            4
        })
    };
    let sum = {
        let (a, b) = (a.clone(), b.clone());
        let order = Arc::clone(&order);
        g.spawn_after(&[a.token(), b.token()], move || {
            order.lock().unwrap().push("sum");
            Ok(a.input()? + b.input()?)
        })
    };
    assert_eq!(sum.complete(), Ok(7));
    let order = order.lock().unwrap();
    assert_eq!(order.last(), Some(&"sum"));
    assert_eq!(order.len(), 3);
}

#[test]
fn completed_handles_release_dependents_immediately() {
    let g = graph();
    let seed = g.completed(String::from("voxels"));
    assert!(seed.is_finished());
    let len = {
        let seed = seed.clone();
        g.spawn_after(&[seed.token()], move || Ok(seed.input()?.len()))
    };
    assert_eq!(len.complete(), Ok(6));
}

#[test]
fn panics_become_errors_and_poison_dependents() {
    let g = graph();
    let bad: JobHandle<u32> = g.spawn(|| panic!("bad fill"));
    let ran = Arc::new(AtomicUsize::new(0));
    let child = {
        let bad = bad.clone();
        let ran = Arc::clone(&ran);
        g.spawn_after(&[bad.token()], move || {
            let v = bad.input()?;
            ran.fetch_add(1, Ordering::SeqCst);
            Ok(v + 1)
        })
    };
    assert_eq!(child.complete(), Err(JobError::DependencyFailed));
    assert_eq!(ran.load(Ordering::SeqCst), 0);
    assert_eq!(bad.complete(), Err(JobError::Panicked("bad fill".into())));
}

#[test]
fn take_moves_the_value_once() {
    let g = graph();
    let h = g.spawn(|| vec![1u8, 2, 3]);
    h.wait();
    assert_eq!(h.peek(|v| v.len()), Ok(3));
    assert_eq!(h.take(), Ok(vec![1, 2, 3]));
    assert_eq!(h.take(), Err(JobError::AlreadyTaken));
}

#[test]
fn unfinished_handles_do_not_block() {
    let g = graph();
    let (tx, rx) = crossbeam_channel::bounded::<()>(0);
    let h = g.spawn(move || {
        let _ = rx.recv();
        1
    });
    assert_eq!(h.take(), Err(JobError::NotFinished));
    assert_eq!(h.peek(|v| *v), Err(JobError::NotFinished));
    tx.send(()).unwrap();
    assert_eq!(h.complete(), Ok(1));
}

#[test]
fn scheduler_finalizes_only_finished_jobs() {
    let g = graph();
    let mut s = JobScheduler::new();
    let (gate_tx, gate_rx) = crossbeam_channel::bounded::<()>(0);
    let slow = g.spawn(move || {
        let _ = gate_rx.recv();
        "slow"
    });
    let fast = g.spawn(|| "fast");
    fast.wait();

    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    for h in [slow, fast] {
        let seen = Arc::clone(&seen);
        s.schedule(h, move |res| seen.lock().unwrap().push(res.unwrap()));
    }
    assert_eq!(s.tick(), 1);
    assert_eq!(*seen.lock().unwrap(), vec!["fast"]);
    assert_eq!(s.pending(), 1);

    gate_tx.send(()).unwrap();
    let mut spins = 0;
    while s.tick() == 0 {
        spins += 1;
        assert!(spins < 5_000, "slow job never finished");
        std::thread::sleep(Duration::from_millis(1));
    }
    assert!(s.is_empty());
    assert_eq!(s.finalized(), 2);
    assert_eq!(*seen.lock().unwrap(), vec!["fast", "slow"]);
}

#[test]
fn scheduler_finalizes_in_submission_order() {
    let g = graph();
    let mut s = JobScheduler::new();
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    for i in 0..6u32 {
        let seen = Arc::clone(&seen);
        s.schedule(g.completed(i), move |res| seen.lock().unwrap().push(res.unwrap()));
    }
    assert_eq!(s.tick(), 6);
    assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn scheduled_future_resolves_on_tick() {
    let g = graph();
    let mut s = JobScheduler::new();
    let h = g.spawn(|| 5u8);
    h.wait();
    let rx = s.schedule_future(h);
    assert!(rx.try_recv().is_err());
    s.tick();
    assert_eq!(rx.try_recv().unwrap(), Ok(5));
}

#[test]
fn scratch_buffers_return_to_the_pool() {
    let pool = ScratchPool::new(2);
    let made = AtomicUsize::new(0);
    let make = || {
        made.fetch_add(1, Ordering::SeqCst);
        vec![0u64; 16]
    };
    {
        let mut a = pool.acquire(make);
        a[0] = 7;
        assert_eq!(pool.idle(), 0);
    }
    assert_eq!(pool.idle(), 1);
    let b = pool.acquire(make);
    assert_eq!(b[0], 7);
    assert_eq!(made.load(Ordering::SeqCst), 1);
}

#[test]
fn engine_config_defaults() {
    let cfg: EngineConfig = toml::from_str("mesher = \"naive\"").unwrap();
    assert_eq!(cfg.mesher, bitvox_mesh_cpu::MesherKind::Naive);
    assert_eq!(cfg.max_jobs_per_tick, 8);
    assert_eq!(cfg.world_radius, 2);
    assert!(cfg.resolved_workers() >= 1);
    let explicit = EngineConfig { worker_threads: 3, ..EngineConfig::default() };
    assert_eq!(explicit.resolved_workers(), 3);
}
