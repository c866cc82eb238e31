use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use quizlink_peer::{run_loop, DisplayListener, Frontend, LoopConfig, LoopExit, Pump, ScreenHandler};
use tracing::info;

use crate::cmd::{parse_duration, DisplayArgs};
use crate::exit::{peer_error, CliError, CliResult, FAILURE, SUCCESS};
use crate::output::{print_screen, OutputFormat};

pub fn run(args: DisplayArgs, format: OutputFormat) -> CliResult<i32> {
    let config = LoopConfig {
        frame_interval: Some(parse_duration(&args.frame_interval)?),
        linger: parse_duration(&args.linger)?,
        ..LoopConfig::default()
    };

    let listener =
        DisplayListener::bind(args.bind.as_str()).map_err(|err| peer_error("bind failed", err))?;
    info!(addr = %listener.local_addr(), "waiting for control panel");

    let mut session = listener
        .accept()
        .map_err(|err| peer_error("accept failed", err))?;

    // Installed only once connected: until then Ctrl-C keeps its default
    // action and ends the process.
    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut handler = ScreenHandler::new();
    let mut frontend = TerminalFrontend::new(running, format);
    let exit = run_loop(&mut session, &mut handler, &mut frontend, &config)
        .map_err(|err| peer_error("display loop failed", err))?;

    Ok(match exit {
        LoopExit::Stopped | LoopExit::Quit => SUCCESS,
        LoopExit::Disconnected => FAILURE,
    })
}

/// Prints the screen to stdout whenever it changes.
struct TerminalFrontend {
    running: Arc<AtomicBool>,
    format: OutputFormat,
    shown: Option<u64>,
}

impl TerminalFrontend {
    fn new(running: Arc<AtomicBool>, format: OutputFormat) -> Self {
        Self {
            running,
            format,
            shown: None,
        }
    }
}

impl Frontend<ScreenHandler> for TerminalFrontend {
    fn pump(&mut self) -> Pump {
        if self.running.load(Ordering::SeqCst) {
            Pump::Continue
        } else {
            Pump::Quit
        }
    }

    fn render(&mut self, handler: &ScreenHandler) -> quizlink_peer::Result<()> {
        if self.shown != Some(handler.revision()) {
            print_screen(handler.screen(), handler.revision(), self.format);
            self.shown = Some(handler.revision());
        }
        Ok(())
    }
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
