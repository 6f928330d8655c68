use std::{fs, num::NonZeroUsize, path::Path};

use comms::{
    OnoReceiver, OnoSender,
    msg::{Command, Msg},
    specs::ModelSpec,
};
use coordinator::Coordinator;
use kernel::{ExchangeErr, Model, PointSet, Solo, scan::count_sequential};
use orchestrator::{
    Mode, OrchestratorError, ResultSink, RunConfig, RunPlan, configs::ModelKind, generate, lead,
};
use tokio::{
    io::{self, DuplexStream, ReadHalf, WriteHalf},
    task::JoinHandle,
};
use worker::{Member, Worker, WorkerErr};

type Channel = (
    OnoReceiver<ReadHalf<DuplexStream>>,
    OnoSender<WriteHalf<DuplexStream>>,
);

fn link() -> (Channel, Channel) {
    let (one, two) = io::duplex(1 << 16);
    let (one_rx, one_tx) = io::split(one);
    let (two_rx, two_tx) = io::split(two);
    (
        comms::channel(one_rx, one_tx),
        comms::channel(two_rx, two_tx),
    )
}

async fn cluster(
    world: usize,
) -> (
    Coordinator<ReadHalf<DuplexStream>, WriteHalf<DuplexStream>>,
    Vec<JoinHandle<worker::Result<usize>>>,
) {
    let mut channels = Vec::new();
    let mut workers = Vec::new();

    for _ in 1..world {
        let (coordinator_end, (rx, tx)) = link();
        channels.push(coordinator_end);

        workers.push(tokio::spawn(async move {
            let member = Member::join(rx, tx).await?;
            Worker::new(member).run().await
        }));
    }

    (Coordinator::new(channels).await.unwrap(), workers)
}

fn quintic() -> ModelSpec {
    ModelKind::Quintic
        .spec(&ModelKind::Quintic.default_coefficients())
        .unwrap()
}

fn config(dir: &Path, mode: Mode, threads: Vec<usize>) -> RunConfig {
    RunConfig {
        mode,
        model: ModelKind::Quintic,
        data_dir: dir.to_path_buf(),
        output: Some(dir.join("out").join(format!("results.{mode}.csv"))),
        threads,
        ..Default::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn hybrid_run_reports_every_round() {
    let dir = tempfile::tempdir().unwrap();
    generate(dir.path(), quintic(), &[100, 250], Some(11)).unwrap();

    let world = NonZeroUsize::new(3).unwrap();
    let plan = RunPlan::load(&config(dir.path(), Mode::Hybrid, vec![1, 4]), world).unwrap();
    let mut sink = ResultSink::open(&plan.output, plan.mode, plan.append).unwrap();

    let (mut coordinator, workers) = cluster(world.get()).await;
    let mut report = Vec::new();
    let outcomes = lead(&mut coordinator, &plan, &mut sink, &mut report)
        .await
        .unwrap();

    for handle in workers {
        assert_eq!(handle.await.unwrap().unwrap(), 4);
    }

    let model = Model::from(quintic());
    for outcome in &outcomes {
        let points = PointSet::load(plan.dataset_path(outcome.spec.dataset)).unwrap();
        assert_eq!(
            outcome.matches,
            count_sequential(&model, points.xs(), points.ys())
        );
    }

    let rows = fs::read_to_string(&plan.output).unwrap();
    let rows: Vec<_> = rows.lines().collect();
    assert_eq!(rows.len(), 4);
    assert!(rows[0].starts_with("3,1,100,"));
    assert!(rows[3].starts_with("3,4,250,"));

    let report = String::from_utf8(report).unwrap();
    assert_eq!(report.lines().count(), 4);
    assert!(report.lines().all(|line| line.starts_with("Processes: 3 | Threads/Process: ")));
}

#[tokio::test]
async fn threads_run_on_a_single_worker() {
    let dir = tempfile::tempdir().unwrap();
    generate(dir.path(), quintic(), &[64], Some(5)).unwrap();

    let plan = RunPlan::load(
        &config(dir.path(), Mode::Threads, Vec::new()),
        NonZeroUsize::MIN,
    )
    .unwrap();
    let mut sink = ResultSink::open(&plan.output, plan.mode, false).unwrap();

    let outcomes = lead(&mut Solo, &plan, &mut sink, &mut std::io::sink())
        .await
        .unwrap();

    let threads: Vec<_> = outcomes.iter().map(|o| o.spec.threads.get()).collect();
    assert_eq!(threads, [1, 2, 4, 8, 12]);
    assert!(outcomes.windows(2).all(|w| w[0].matches == w[1].matches));

    let rows = fs::read_to_string(&plan.output).unwrap();
    assert!(rows.lines().zip(threads).all(|(row, t)| row.starts_with(&format!("{t},64,"))));
}

#[tokio::test]
async fn missing_dataset_aborts_every_worker() {
    let dir = tempfile::tempdir().unwrap();
    generate(dir.path(), quintic(), &[10, 20], Some(9)).unwrap();

    let world = NonZeroUsize::new(2).unwrap();
    let plan = RunPlan::load(&config(dir.path(), Mode::Processes, Vec::new()), world).unwrap();
    let mut sink = ResultSink::open(&plan.output, plan.mode, false).unwrap();

    // Vanishes after the startup check.
    fs::remove_file(plan.dataset_path(20)).unwrap();

    let (mut coordinator, workers) = cluster(world.get()).await;
    let err = lead(&mut coordinator, &plan, &mut sink, &mut std::io::sink())
        .await
        .unwrap_err();
    assert!(matches!(err, OrchestratorError::DatasetOpen { .. }));

    for handle in workers {
        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            WorkerErr::Exchange(ExchangeErr::Aborted(_))
        ));
    }

    // The round of the first dataset was kept.
    let rows = fs::read_to_string(&plan.output).unwrap();
    assert_eq!(rows.lines().collect::<Vec<_>>().len(), 1);
    assert!(rows.starts_with("2,10,"));
}

#[tokio::test]
async fn member_abort_reaches_the_other_workers() {
    let dir = tempfile::tempdir().unwrap();
    generate(dir.path(), quintic(), &[10], Some(3)).unwrap();

    let world = NonZeroUsize::new(3).unwrap();
    let plan = RunPlan::load(&config(dir.path(), Mode::Processes, Vec::new()), world).unwrap();
    let mut sink = ResultSink::open(&plan.output, plan.mode, false).unwrap();

    // Rank 1 fails right after the model arrives.
    let (failing_end, (mut rx, mut tx)) = link();
    let failing = tokio::spawn(async move {
        let mut buf: Vec<f64> = Vec::new();
        let msg: Msg = rx.recv_into(&mut buf).await.unwrap();
        assert!(matches!(msg, Msg::Control(Command::Join { rank: 1, world: 3 })));
        let msg: Msg = rx.recv_into(&mut buf).await.unwrap();
        assert!(matches!(msg, Msg::Control(Command::Model(_))));

        tx.send(&Msg::Err("local failure".into())).await.unwrap();
        (rx, tx)
    });

    let (healthy_end, (rx, tx)) = link();
    let healthy = tokio::spawn(async move {
        let member = Member::join(rx, tx).await?;
        Worker::new(member).run().await
    });

    let mut coordinator = Coordinator::new(vec![failing_end, healthy_end])
        .await
        .unwrap();
    let err = lead(&mut coordinator, &plan, &mut sink, &mut std::io::sink())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OrchestratorError::Exchange(ExchangeErr::Aborted(ref reason)) if reason == "local failure"
    ));

    // The coordinator stays connected, so only the abort can stop rank 2.
    let res = tokio::time::timeout(std::time::Duration::from_secs(5), healthy)
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(
        res,
        Err(WorkerErr::Exchange(ExchangeErr::Aborted(ref reason))) if reason == "local failure"
    ));

    let _ends = failing.await.unwrap();
    drop(coordinator);
}
