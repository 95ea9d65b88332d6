#[cfg(test)]
mod integration_tests {
    use fanout_scheduler::config::SchedulerConfig;
    use fanout_scheduler::{TaskOutcome, TaskScheduler};
    use std::collections::HashSet;
    use std::fmt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum JobError {
        Boom,
        Rejected { code: u16 },
    }

    impl fmt::Display for JobError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                JobError::Boom => write!(f, "boom"),
                JobError::Rejected { code } => write!(f, "rejected with {}", code),
            }
        }
    }

    fn quiet<E>() -> TaskScheduler<E> {
        TaskScheduler::with_config(SchedulerConfig::quiet()).unwrap()
    }

    #[tokio::test]
    async fn test_success_and_failure_run_in_parallel() {
        let mut scheduler = quiet::<JobError>();
        scheduler.add_task("A", || {
            std::thread::sleep(Duration::from_millis(100));
            Ok(())
        });
        scheduler.add_task("B", || {
            std::thread::sleep(Duration::from_millis(50));
            Err(JobError::Boom)
        });

        let started = Instant::now();
        scheduler.execute().await;
        let elapsed = started.elapsed();

        let results = scheduler.results();
        assert_eq!(results.len(), 2);

        let a: Vec<_> = results.iter().filter(|r| r.name == "A").collect();
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].outcome, TaskOutcome::Success);
        assert!(a[0].duration >= Duration::from_millis(100));

        let b: Vec<_> = results.iter().filter(|r| r.name == "B").collect();
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].outcome, TaskOutcome::Failure(JobError::Boom));
        assert!(b[0].duration >= Duration::from_millis(50));

        // Serial execution would need at least 150ms
        assert!(elapsed >= Duration::from_millis(100));
        assert!(elapsed < Duration::from_millis(150), "took {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_equal_sleeps_overlap() {
        let delay = Duration::from_millis(200);
        let mut scheduler = quiet::<JobError>();
        for name in ["left", "right"] {
            scheduler.add_task(name, move || {
                std::thread::sleep(delay);
                Ok(())
            });
        }

        let started = Instant::now();
        scheduler.execute().await;
        let elapsed = started.elapsed();

        assert_eq!(scheduler.results().len(), 2);
        assert!(elapsed < delay * 3 / 2, "took {:?}", elapsed);

        // Summary sums task time, so it exceeds the real elapsed time
        assert!(scheduler.summary().total_duration >= delay * 2);
    }

    #[tokio::test]
    async fn test_zero_tasks() {
        let mut scheduler = quiet::<JobError>();
        scheduler.execute().await;

        assert!(scheduler.results().is_empty());

        let summary = scheduler.summary();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.total_duration, Duration::ZERO);

        let mut out = Vec::new();
        scheduler.write_summary(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("total duration: 0ns"));
        assert!(!text.contains("task:"));
    }

    #[tokio::test]
    async fn test_thousand_tasks_no_lost_results() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut scheduler = quiet::<JobError>();
        for i in 0..1000 {
            let counter = counter.clone();
            scheduler.add_task(format!("task-{}", i), move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }

        scheduler.execute().await;

        assert_eq!(counter.load(Ordering::SeqCst), 1000);
        let results = scheduler.results();
        assert_eq!(results.len(), 1000);
        assert!(results.iter().all(|r| r.is_success()));

        let names: HashSet<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names.len(), 1000);
        for i in 0..1000 {
            assert!(names.contains(format!("task-{}", i).as_str()));
        }
    }

    #[tokio::test]
    async fn test_failure_keeps_exact_value() {
        let mut scheduler = quiet::<JobError>();
        scheduler.add_task("reject", || Err(JobError::Rejected { code: 503 }));
        scheduler.add_async_task("async reject", async { Err(JobError::Rejected { code: 429 }) });
        scheduler.execute().await;

        let reject = scheduler.results().iter().find(|r| r.name == "reject").unwrap();
        assert_eq!(reject.outcome.error(), Some(&JobError::Rejected { code: 503 }));

        let async_reject = scheduler
            .results()
            .iter()
            .find(|r| r.name == "async reject")
            .unwrap();
        assert_eq!(async_reject.outcome.error(), Some(&JobError::Rejected { code: 429 }));
    }

    #[tokio::test]
    async fn test_default_error_type_is_anyhow() {
        let mut scheduler: TaskScheduler =
            TaskScheduler::with_config(SchedulerConfig::quiet()).unwrap();
        scheduler.add_task("bails", || anyhow::bail!("boom"));
        scheduler.execute().await;

        let result = &scheduler.results()[0];
        assert_eq!(result.outcome.error().map(|e| e.to_string()), Some("boom".to_string()));
    }

    #[tokio::test]
    async fn test_summary_is_idempotent() {
        let mut scheduler = quiet::<JobError>();
        scheduler.add_task("ok", || Ok(()));
        scheduler.add_task("bad", || Err(JobError::Boom));
        scheduler.execute().await;

        let mut first = Vec::new();
        let mut second = Vec::new();
        scheduler.write_summary(&mut first).unwrap();
        scheduler.write_summary(&mut second).unwrap();

        assert_eq!(first, second);
        assert_eq!(scheduler.results().len(), 2);
    }

    #[tokio::test]
    async fn test_bounded_fan_out_queues_work() {
        let config = SchedulerConfig {
            max_concurrency: Some(2),
            print_status: false,
        };
        let mut scheduler = TaskScheduler::<JobError>::with_config(config).unwrap();
        for i in 0..4 {
            scheduler.add_async_task(format!("job-{}", i), async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(())
            });
        }

        let started = Instant::now();
        scheduler.execute().await;
        let elapsed = started.elapsed();

        assert_eq!(scheduler.results().len(), 4);
        // Two waves of two
        assert!(elapsed >= Duration::from_millis(100), "took {:?}", elapsed);
        // Queueing time is not counted against a task
        assert!(scheduler
            .results()
            .iter()
            .all(|r| r.duration < Duration::from_millis(100)));
    }

    #[tokio::test]
    async fn test_one_failure_does_not_affect_others() {
        let mut scheduler = quiet::<JobError>();
        scheduler.add_task("panics", || panic!("worker crashed"));
        scheduler.add_task("fails", || Err(JobError::Boom));
        scheduler.add_task("succeeds", || {
            std::thread::sleep(Duration::from_millis(10));
            Ok(())
        });
        scheduler.execute().await;

        let summary = scheduler.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.aborted, 1);
    }

    #[tokio::test]
    async fn test_wide_blocking_fan_out_times_only_the_action() {
        let sleep = Duration::from_millis(200);
        let mut scheduler = quiet::<JobError>();
        for i in 0..600 {
            scheduler.add_task(format!("sleeper-{}", i), move || {
                std::thread::sleep(sleep);
                Ok(())
            });
        }

        let started = Instant::now();
        scheduler.execute().await;
        let elapsed = started.elapsed();

        let results = scheduler.results();
        assert_eq!(results.len(), 600);
        let slowest = results.iter().map(|r| r.duration).max().unwrap();
        assert!(slowest >= sleep);
        assert!(slowest < sleep * 3 / 2, "slowest task took {:?}", slowest);
        // A 512-thread pool would need a second wave
        assert!(elapsed < sleep * 2, "batch took {:?}", elapsed);
    }
}
