use std::time::Duration;

use clap::Parser;
use tokio::task::JoinHandle;

use minirds::constants::{DEFAULT_OUTPUT_RATE_HZ, SHUTDOWN_JOIN_TIMEOUT_MS};
use minirds::control::transport::{PipeTransport, TcpTransport};
use minirds::control::{parser, Command, ControlTransport};
use minirds::generator::{GeneratorConfig, GeneratorHandle, GeneratorLoop};
use minirds::logging::{init_logger, log_error, log_info, log_warn};
use minirds::rds::ProgramFlags;
use minirds::sink::{AudioSink, CpalSink, WavFileSink};

#[derive(Parser, Debug)]
#[command(name = "minirds")]
#[command(about = "Real-time FM MPX baseband generator with RDS/RDS2 subcarriers")]
struct Cli {
    /// Programme Identification code, hex or decimal (e.g. 0x1ABC or 6844).
    #[arg(long, default_value = "0x1000")]
    pi: String,

    /// Programme Service name, padded/truncated to 8 characters.
    #[arg(long, default_value = "MiniRDS")]
    ps: String,

    /// RadioText, padded/truncated to 64 characters.
    #[arg(long, default_value = "MiniRDS: Software RDS encoder")]
    rt: String,

    /// Programme Type code, 0-31.
    #[arg(long, default_value_t = 0)]
    pty: u8,

    /// MPX output sample rate in Hz.
    #[arg(long, default_value_t = DEFAULT_OUTPUT_RATE_HZ)]
    mpx: u32,

    /// 1 streams to the default live audio device; 0 renders to the WAV
    /// file named by `--out` instead, for offline rendering and tests.
    #[arg(long, default_value_t = 1)]
    wait: u8,

    /// Output WAV file path, used when `--wait 0`.
    #[arg(long, default_value = "minirds_out.wav")]
    out: String,

    /// Opens a named-pipe control transport at this path.
    #[arg(long)]
    ctl: Option<String>,

    /// Opens a TCP control listener on 127.0.0.1 at this port.
    #[arg(long)]
    port: Option<u16>,

    /// Loads a station-logo image for RDS2 File Transfer at startup.
    /// Requires `--rds2`.
    #[arg(long)]
    rft: Option<String>,

    /// 1 enables the RDS2 subcarriers (long PS, eRT, RT+, RFT) in addition
    /// to classic IEC 62106 groups; 0 keeps the mix RDS2-free.
    #[arg(long, default_value_t = u8::from(cfg!(feature = "rds2")))]
    rds2: u8,
}

fn main() {
    init_logger();
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime");

    let code = runtime.block_on(run(cli));
    std::process::exit(code);
}

fn parse_pi(raw: &str) -> Result<u16, String> {
    let trimmed = raw.trim();
    let (digits, radix) = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None => (trimmed, 10),
    };
    u16::from_str_radix(digits, radix).map_err(|e| format!("{raw:?} is not a valid PI code: {e}"))
}

async fn run(cli: Cli) -> i32 {
    let initial_pi = match parse_pi(&cli.pi) {
        Ok(pi) => pi,
        Err(reason) => {
            log_error(&format!("configuration error: {reason}"));
            return 3;
        }
    };

    let config = GeneratorConfig {
        output_rate_hz: cli.mpx,
        rds2_enabled: cli.rds2 != 0,
        initial_pi,
        initial_ps: cli.ps.clone(),
        initial_rt: cli.rt.clone(),
        initial_pty: cli.pty,
        ..GeneratorConfig::default()
    };

    let live = cli.wait != 0;
    let out_path = cli.out.clone();

    // `cpal::Stream` and friends aren't `Send`, so the sink is built inside
    // the dedicated generator thread rather than handed in from here; the
    // thread reports back its `GeneratorHandle` (or an init failure) over a
    // oneshot once construction finishes.
    let (ready_tx, ready_rx) = tokio::sync::oneshot::channel();
    let (done_tx, done_rx) = tokio::sync::oneshot::channel();

    let generator_thread = match std::thread::Builder::new()
        .name("minirds-generator".into())
        .spawn(move || {
            let sink_result: Result<Box<dyn AudioSink>, minirds::RdsError> = if live {
                CpalSink::new(config.output_rate_hz).map(|s| Box::new(s) as Box<dyn AudioSink>)
            } else {
                WavFileSink::create(&out_path, config.output_rate_hz)
                    .map(|s| Box::new(s) as Box<dyn AudioSink>)
            };

            let sink = match sink_result {
                Ok(sink) => sink,
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };

            match GeneratorLoop::new(config, sink) {
                Ok((generator, handle)) => {
                    let _ = ready_tx.send(Ok(handle));
                    let _ = generator.run();
                    let _ = done_tx.send(());
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            }
        }) {
        Ok(thread) => thread,
        Err(e) => {
            log_error(&format!("failed to spawn generator thread: {e}"));
            return 1;
        }
    };

    let handle = match ready_rx.await {
        Ok(Ok(handle)) => handle,
        Ok(Err(e)) => {
            log_error(&format!("{e}"));
            let code = e.exit_code().unwrap_or(1);
            let _ = generator_thread.join();
            return code;
        }
        Err(_) => {
            log_error("generator thread exited before it finished initializing");
            let _ = generator_thread.join();
            return 1;
        }
    };
    log_info("generator started");

    {
        let stop_handle = handle.clone();
        if let Err(e) = ctrlc::set_handler(move || stop_handle.request_stop()) {
            log_warn(&format!("failed to install Ctrl-C handler: {e}"));
        }
    }

    if let Some(path) = cli.rft {
        if cli.rds2 != 0 {
            handle.send(Command::LoadRftFile(path));
        } else {
            log_warn("--rft given without --rds2; ignoring RFT image");
        }
    }

    let mut transport_tasks: Vec<JoinHandle<()>> = Vec::new();

    if let Some(pipe_name) = cli.ctl {
        match PipeTransport::create(&pipe_name) {
            Ok(transport) => {
                log_info(&format!("control pipe open at {pipe_name}"));
                transport_tasks.push(tokio::spawn(run_control_transport(
                    Box::new(transport),
                    handle.clone(),
                )));
            }
            Err(e) => log_error(&format!("failed to open control pipe {pipe_name:?}: {e}")),
        }
    }

    if let Some(port) = cli.port {
        let addr = format!("127.0.0.1:{port}");
        match TcpTransport::bind(&addr).await {
            Ok(transport) => {
                log_info(&format!("control TCP listener bound on {addr}"));
                transport_tasks.push(tokio::spawn(run_control_transport(
                    Box::new(transport),
                    handle.clone(),
                )));
            }
            Err(e) => log_error(&format!("failed to bind control TCP listener on {addr}: {e}")),
        }
    }

    // Blocks until Ctrl-C (or a control command) sets the stop flag and the
    // generator notices it, or until the sink itself fails.
    let _ = done_rx.await;

    for task in &transport_tasks {
        task.abort();
    }

    match tokio::time::timeout(
        Duration::from_millis(SHUTDOWN_JOIN_TIMEOUT_MS),
        tokio::task::spawn_blocking(move || generator_thread.join()),
    )
    .await
    {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(_panic))) => log_error("generator thread panicked"),
        Ok(Err(_spawn_err)) => log_error("failed to join generator thread"),
        Err(_elapsed) => log_warn(
            "generator thread did not join within the shutdown timeout; releasing resources best-effort",
        ),
    }

    log_info("generator stopped");
    0
}

/// Reads lines from one control transport for the lifetime of the process,
/// translating each into a `Command` and forwarding it to the generator.
/// Blank lines and lines starting with `#` are ignored; malformed lines are
/// logged and otherwise dropped, matching the "configuration error: logged,
/// command skipped" handling.
async fn run_control_transport(mut transport: Box<dyn ControlTransport>, handle: GeneratorHandle) {
    loop {
        if handle.is_stopped() {
            return;
        }

        match transport.recv_line().await {
            Ok(Some(line)) => {
                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    continue;
                }

                let flags = ProgramFlags::from_bits_truncate(handle.get_params().flags_bits);
                match parser::parse(trimmed, flags) {
                    Ok(command) => handle.send(command),
                    Err(e) => log_warn(&format!("{e}")),
                }
            }
            Ok(None) => return,
            Err(e) => log_warn(&format!("control transport error: {e}")),
        }
    }
}
