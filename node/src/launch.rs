use std::{
    env, fs,
    io::{self, BufReader},
    net::SocketAddr,
};

use kernel::Solo;
use log::{info, warn};
use orchestrator::{
    ResultSink, RunPlan,
    configs::Coefficients,
    summary::{read_samples, render, summarize},
};
use tokio::{
    net::TcpListener,
    process::{Child, Command},
};
use worker::Worker;

use crate::cli::{Commands, GenerateArgs, RunArgs};

/// Runs the chosen subcommand to completion.
pub async fn dispatch(command: Commands) -> io::Result<()> {
    match command {
        Commands::Run(args) => coordinate(args).await,
        Commands::Worker { connect } => follow(connect).await,
        Commands::Generate(args) => generate(args),
        Commands::Summary { results } => {
            let reader = BufReader::new(fs::File::open(&results)?);
            let rows = summarize(&read_samples(reader)?);

            if rows.is_empty() {
                warn!("no size of {} has a single unit baseline", results.display());
            }

            print!("{}", render(&rows));
            Ok(())
        }
    }
}

/// Leads the run, spawning the other workers unless asked not to.
async fn coordinate(args: RunArgs) -> io::Result<()> {
    let workers = args.procs;

    // Every input is checked before any worker is started.
    let plan = RunPlan::load(&args.config(), workers)?;
    let mut sink = ResultSink::open(&plan.output, plan.mode, plan.append)?;
    let mut stdout = io::stdout();

    if workers.get() == 1 {
        orchestrator::lead(&mut Solo, &plan, &mut sink, &mut stdout).await?;
        return Ok(());
    }

    let members = workers.get() - 1;
    let listener = TcpListener::bind(args.listen).await?;
    let addr = listener.local_addr()?;
    info!("coordinator listening at {addr}, waiting for {members} worker(s)");

    let mut children = Vec::new();
    if !args.no_spawn {
        for _ in 0..members {
            children.push(spawn_worker(addr)?);
        }
    }

    let mut coordinator = coordinator::accept(&listener, members).await?;
    orchestrator::lead(&mut coordinator, &plan, &mut sink, &mut stdout).await?;

    for child in &mut children {
        let status = child.wait().await?;
        if !status.success() {
            return Err(io::Error::other(format!("a worker exited with {status}")));
        }
    }

    Ok(())
}

/// Starts this same binary as a worker of the coordinator at `addr`.
fn spawn_worker(addr: SocketAddr) -> io::Result<Child> {
    Command::new(env::current_exe()?)
        .arg("worker")
        .arg("--connect")
        .arg(addr.to_string())
        .kill_on_drop(true)
        .spawn()
}

async fn follow(addr: SocketAddr) -> io::Result<()> {
    let member = worker::connect(addr).await?;
    Worker::new(member).run().await?;
    Ok(())
}

fn generate(args: GenerateArgs) -> io::Result<()> {
    let coeffs = match &args.coeffs {
        Some(path) => Coefficients::load(path)?,
        None => args.model.default_coefficients(),
    };

    let model = args.model.spec(&coeffs)?;
    orchestrator::generate(&args.data_dir, model, &args.sizes, args.seed)?;

    info!(
        datasets = args.sizes.len();
        "generated {} model datasets in {}",
        args.model,
        args.data_dir.display()
    );
    Ok(())
}
