use log::{error, info, warn};

use structopt::StructOpt;

use simplelog::{LevelFilter, TermLogger, TerminalMode};

use spi_lld::poll::SpinBudget;
use spi_lld::sim::Loopback;
use spi_lld::{mode_from_index, BitOrder, ClockDivider, Settings, SpiMaster};

type Error = Box<dyn std::error::Error>;
type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, PartialEq, StructOpt)]
struct Options {
    #[structopt(subcommand)]
    operation: Operations,

    /// SPI baud rate
    #[structopt(long, default_value = "4000000", env = "SPI_BAUD")]
    freq: u32,

    /// SPI mode (0-3)
    #[structopt(long, default_value = "0", env = "SPI_MODE")]
    mode: u8,

    /// Shift the least significant bit first
    #[structopt(long)]
    lsb_first: bool,

    /// Give up on a status flag after this many polls
    #[structopt(long, default_value = "100000")]
    poll_budget: u32,

    /// Configure log level
    #[structopt(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: LevelFilter,
}

#[derive(Debug, PartialEq, StructOpt)]
pub enum Operations {
    /// Exchange bytes over the loopback channel
    Exchange {
        /// Data to send in hexadecimal
        data: HexData,
    },
    /// Show the shift clock programmed for each SPI mode
    Modes,
    /// Show the baud rate programmed for each clock divider
    Clocks,
    /// Exchange a byte over a channel that never completes
    Stall,
}

#[derive(Debug, PartialEq)]
pub struct HexData(Vec<u8>);

impl std::str::FromStr for HexData {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        hex::decode(s).map(HexData)
    }
}

trait ResultExt<T, E> {
    fn dbg_err(self, msg: &str) -> Result<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T, E> for std::result::Result<T, E> {
    fn dbg_err(self, msg: &str) -> Result<T> {
        self.map_err(|e| format!("{}: {:?}", msg, e).into())
    }
}

fn main() {
    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Load options
    let opts = Options::from_args();

    // Setup logging
    TermLogger::init(opts.log_level, simplelog::Config::default(), TerminalMode::Mixed)
        .dbg_err("logger")?;

    let settings = Settings::new(
        opts.freq,
        if opts.lsb_first {
            BitOrder::LsbFirst
        } else {
            BitOrder::MsbFirst
        },
        mode_from_index(opts.mode).dbg_err("--mode")?,
    );
    let deadline = SpinBudget::new(opts.poll_budget);

    match &opts.operation {
        Operations::Exchange { data } => {
            let mut spi =
                SpiMaster::new(Loopback::new(), Loopback::wiring()).with_deadline(deadline);
            spi.begin(settings);
            info!("Exchanging {} bytes with {:?}", data.0.len(), spi.settings());

            let mut received = Vec::with_capacity(data.0.len());
            for byte in &data.0 {
                received.push(spi.exchange_byte(*byte).dbg_err("exchange")?);
            }

            info!("Sent:     {}", hex::encode(&data.0));
            info!("Received: {}", hex::encode(&received));
            spi.end();
        }
        Operations::Modes => {
            let mut spi = SpiMaster::new(Loopback::new(), Loopback::wiring());
            spi.begin(settings);
            for index in 0..4 {
                let mode = mode_from_index(index).dbg_err("mode")?;
                spi.set_mode(mode).dbg_err("set mode")?;
                info!("mode {}: {:?}", index, spi.lld().shift_clock);
            }
        }
        Operations::Clocks => {
            let mut spi = SpiMaster::new(Loopback::new(), Loopback::wiring());
            spi.begin(settings);
            for divider in ClockDivider::ALL.iter() {
                spi.set_clock_divider(*divider).dbg_err("set clock divider")?;
                info!(
                    "{:>3}: {} Hz",
                    divider.divisor(),
                    spi.lld().baudrate.unwrap_or(0)
                );
            }
        }
        Operations::Stall => {
            let mut spi =
                SpiMaster::new(Loopback::stalled(), Loopback::wiring()).with_deadline(deadline);
            spi.begin(settings);
            match spi.exchange_byte(0xFF) {
                Ok(byte) => info!("Unexpectedly received {:02x}", byte),
                Err(e) => warn!("Exchange failed as expected: {}", e),
            }
        }
    }

    Ok(())
}
