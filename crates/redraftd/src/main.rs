use clap::{Parser, Subcommand};
use rd_api::rest::health::init_start_time;
use rd_api::{build_router, AppState};
use rd_config::{ConfigPaths, ServiceConfig};
use redraftd::{is_process_alive, read_pid_file, remove_pid_file, write_pid_file};
use std::net::SocketAddr;

#[derive(Parser)]
#[command(
    name = "redraftd",
    version = redraftd::DAEMON_VERSION,
    about = "Redraft text humanizer daemon"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the daemon in the background
    Start {
        /// Port to bind to (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run the daemon in the foreground
    Run {
        /// Port to bind to (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Check daemon status
    Status,
    /// Stop a running daemon
    Stop,
    /// Print version
    Version,
}

fn read_pid(paths: &ConfigPaths) -> Option<u32> {
    read_pid_file(&paths.pid_path())
}

fn write_pid(paths: &ConfigPaths) -> anyhow::Result<()> {
    write_pid_file(&paths.pid_path())
}

fn remove_pid(paths: &ConfigPaths) {
    remove_pid_file(&paths.pid_path());
}

fn pid_looks_like_redraftd(pid: u32) -> bool {
    #[cfg(unix)]
    {
        let comm_output = std::process::Command::new("ps")
            .arg("-p")
            .arg(pid.to_string())
            .arg("-o")
            .arg("comm=")
            .output();

        match comm_output {
            Ok(out) if out.status.success() => {
                let comm = String::from_utf8_lossy(&out.stdout)
                    .trim()
                    .to_ascii_lowercase();
                comm.ends_with("redraftd")
            }
            _ => false,
        }
    }
    #[cfg(not(unix))]
    {
        let _ = pid;
        true
    }
}

/// Refuses to run when a live daemon owns the PID file; clears the file
/// when it points at a dead or foreign process.
fn guard_against_running_daemon(paths: &ConfigPaths) -> anyhow::Result<()> {
    if let Some(pid) = read_pid(paths) {
        if is_process_alive(pid) {
            if !pid_looks_like_redraftd(pid) {
                tracing::warn!(
                    "PID file points to live non-redraftd process {}, cleaning up.",
                    pid
                );
                remove_pid(paths);
            } else {
                anyhow::bail!(
                    "Daemon already running (PID {}). Use 'redraftd stop' first.",
                    pid
                );
            }
        } else {
            tracing::warn!("Removing stale PID file for dead process {}", pid);
            remove_pid(paths);
        }
    }
    Ok(())
}

#[cfg(unix)]
fn send_signal(pid: u32, signal: i32) -> anyhow::Result<()> {
    let raw_pid = i32::try_from(pid).map_err(|_| anyhow::anyhow!("PID out of range: {}", pid))?;
    // Safety: `raw_pid` is validated as a positive process id for libc::kill.
    let rc = unsafe { libc::kill(raw_pid, signal) };
    if rc != 0 {
        return Err(std::io::Error::last_os_error().into());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "redraftd=info,rd_api=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let paths = ConfigPaths::new()?;

    match cli.command {
        Commands::Start { port } => {
            let config = ServiceConfig::load()?;
            guard_against_running_daemon(&paths)?;
            paths.ensure_config_dir()?;

            let exe = std::env::current_exe()?;
            let out_log = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(paths.config_dir().join("redraftd.out.log"))?;
            let err_log = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(paths.config_dir().join("redraftd.err.log"))?;

            let mut cmd = std::process::Command::new(&exe);
            cmd.arg("run")
                .stdin(std::process::Stdio::null())
                .stdout(out_log)
                .stderr(err_log);
            if let Some(port) = port {
                cmd.arg("--port").arg(port.to_string());
            }
            cmd.spawn()?;

            println!("Redraft daemon started.");
            println!();
            println!(
                "  API:  http://{}:{}",
                config.host,
                port.unwrap_or(config.port)
            );
            println!();

            Ok(())
        }

        Commands::Run { port } => {
            let mut config = ServiceConfig::load()?;
            if let Some(port) = port {
                config.port = port;
            }

            guard_against_running_daemon(&paths)?;
            paths.ensure_config_dir()?;
            write_pid(&paths)?;

            println!("Redraft daemon running...");
            println!();
            println!("  API:  http://{}:{}", config.host, config.port);
            println!();

            init_start_time();

            let state = AppState::new(config.clone())?;
            let app = build_router(state);

            let addr: SocketAddr = config.bind_addr().parse()?;
            tracing::info!("Listening on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;

            let shutdown_paths = paths.clone();
            let shutdown = async move {
                #[cfg(unix)]
                {
                    let mut terminate =
                        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                            .expect("Failed to install SIGTERM handler");
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {}
                        _ = terminate.recv() => {}
                    }
                }
                #[cfg(not(unix))]
                {
                    tokio::signal::ctrl_c()
                        .await
                        .expect("Failed to listen for ctrl+c");
                }
                tracing::info!("Shutting down...");
                remove_pid(&shutdown_paths);
            };

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await?;

            Ok(())
        }

        Commands::Status => {
            match read_pid(&paths) {
                Some(pid) if is_process_alive(pid) && pid_looks_like_redraftd(pid) => {
                    println!("Daemon is running (PID {})", pid);
                    let config = ServiceConfig::load()?;
                    match reqwest::get(format!("http://{}/health", config.bind_addr())).await {
                        Ok(resp) => {
                            let body: serde_json::Value = resp.json().await?;
                            println!("Version: {}", body["version"].as_str().unwrap_or("unknown"));
                            println!("Uptime: {}s", body["uptime_secs"].as_u64().unwrap_or(0));
                        }
                        Err(_) => {
                            println!("(Could not reach health endpoint)");
                        }
                    }
                }
                Some(pid) if is_process_alive(pid) => {
                    println!(
                        "PID file points to non-redraftd process {}. Cleaning stale PID file.",
                        pid
                    );
                    remove_pid(&paths);
                }
                Some(pid) => {
                    println!("Daemon is not running (stale PID {})", pid);
                    remove_pid(&paths);
                }
                None => {
                    println!("Daemon is not running");
                }
            }
            Ok(())
        }

        Commands::Stop => {
            match read_pid(&paths) {
                Some(pid) if is_process_alive(pid) && pid_looks_like_redraftd(pid) => {
                    println!("Stopping daemon (PID {})...", pid);
                    #[cfg(unix)]
                    send_signal(pid, libc::SIGTERM)?;
                    for _ in 0..50 {
                        if !is_process_alive(pid) {
                            break;
                        }
                        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                    }
                    if is_process_alive(pid) {
                        println!("Force killing...");
                        #[cfg(unix)]
                        send_signal(pid, libc::SIGKILL)?;
                    }
                    remove_pid(&paths);
                    println!("Daemon stopped.");
                }
                Some(pid) if is_process_alive(pid) => {
                    println!(
                        "Refusing to stop PID {} because it is not redraftd. Cleaning stale PID file.",
                        pid
                    );
                    remove_pid(&paths);
                }
                Some(pid) => {
                    println!("Daemon not running (stale PID {}), cleaning up.", pid);
                    remove_pid(&paths);
                }
                None => {
                    println!("Daemon is not running.");
                }
            }
            Ok(())
        }

        Commands::Version => {
            println!("redraftd {}", redraftd::DAEMON_VERSION);
            Ok(())
        }
    }
}
