use clap::{ArgGroup, Parser};
use tracing_subscriber::EnvFilter;

use k15ctl::common::transport::MAX_NB_NODE;
use k15ctl::config::parse_range_list;
use k15ctl::display::{render_cpu_table, render_nb_table, with_cpu_candidate, with_nb_candidate};
use k15ctl::{
    CpuOverrides, HardwareTransport, K15Error, NbOverrides, PStateController, PStateSelection,
    RegisterTransport, Result, TransportConfig,
};

#[derive(Parser, Debug)]
#[command(name = "k15ctl")]
#[command(about = "AMD Family 15h (Bulldozer) P-State, frequency and voltage modification utility")]
#[command(after_help = "\
Warning:
  USE THIS PROGRAM AT YOUR OWN RISK. IT MAY DAMAGE YOUR HARDWARE.

Examples:
  k15ctl --cpu 0-3
      Print the P-state tables of cores 0-3
  k15ctl --cpu 0-3 --p 0 --cv 22 --cd 0 --cf 16
      Set CpuVid=22, CpuDid=0, CpuFid=16 for P-State 0 on cores 0-3
  k15ctl --cpu 0-3 --bp 0 --cf 22 --nb 0 --np 0 --nf 22 --dry-run
      Preview boosted P-State 0 with CpuFid=22 and NB P-State 0 with NbFid=22")]
#[command(group(
    ArgGroup::new("target")
        .required(true)
        .multiple(true)
        .args(["cpus", "nodes"])
))]
struct Args {
    #[arg(
        long = "cpu",
        value_name = "CPUS",
        help = "Cores to show or configure (supports ranges: --cpu 0-3 or --cpu 0,2)",
        action = clap::ArgAction::Append
    )]
    cpus: Vec<String>,

    #[arg(long = "p", value_name = "P-STATE", help = "P-State to configure")]
    pstate: Option<u8>,

    #[arg(long = "bp", value_name = "BP-STATE", help = "Boosted P-State to configure")]
    boosted_pstate: Option<u8>,

    #[arg(long = "cf", value_name = "CPUFID", help = "CPU Frequency ID")]
    cpu_fid: Option<u8>,

    #[arg(long = "cd", value_name = "CPUDID", help = "CPU Divisor ID")]
    cpu_did: Option<u8>,

    #[arg(long = "cv", value_name = "CPUVID", help = "CPU Voltage ID")]
    cpu_vid: Option<u8>,

    #[arg(long = "cnp", value_name = "NBPSTATE", help = "Associated Northbridge P-State")]
    cpu_nb_pstate: Option<u8>,

    #[arg(long = "pd", value_name = "MW", help = "Power dissipation in mW")]
    power_mw: Option<f64>,

    #[arg(
        long = "en",
        value_name = "ENABLE",
        help = "Enable (1) or disable (0) the P-State",
        value_parser = clap::value_parser!(u8).range(0..=1)
    )]
    enable: Option<u8>,

    #[arg(
        long = "nb",
        value_name = "NBS",
        help = "Northbridges to show or configure (supports ranges: --nb 0-1)",
        action = clap::ArgAction::Append
    )]
    nodes: Vec<String>,

    #[arg(long = "np", value_name = "NP-STATE", help = "Northbridge P-State to configure")]
    nb_pstate: Option<u8>,

    #[arg(long = "nf", value_name = "NBFID", help = "Northbridge Frequency ID")]
    nb_fid: Option<u8>,

    #[arg(long = "nd", value_name = "NBDID", help = "Northbridge Divisor ID")]
    nb_did: Option<u8>,

    #[arg(long = "nv", value_name = "NBVID", help = "Northbridge Voltage ID")]
    nb_vid: Option<u8>,

    #[arg(
        long = "nben",
        value_name = "ENABLE",
        help = "Enable (1) or disable (0) the Northbridge P-State",
        value_parser = clap::value_parser!(u8).range(0..=1)
    )]
    nb_enable: Option<u8>,

    #[arg(long, help = "Show the resulting tables without modifying any register")]
    dry_run: bool,

    #[arg(short, long, help = "Enable verbose logging (shows every register access)")]
    verbose: bool,
}

impl Args {
    fn cpu_overrides(&self) -> CpuOverrides {
        CpuOverrides {
            cpu_fid: self.cpu_fid,
            cpu_did: self.cpu_did,
            cpu_vid: self.cpu_vid,
            nb_pstate: self.cpu_nb_pstate,
            pstate_en: self.enable.map(|en| en != 0),
            power_mw: self.power_mw,
        }
    }

    fn nb_overrides(&self) -> NbOverrides {
        NbOverrides {
            nb_fid: self.nb_fid,
            nb_did: self.nb_did,
            nb_vid: self.nb_vid,
            nb_pstate_en: self.nb_enable.map(|en| en != 0),
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn check_permissions(config: &TransportConfig) -> Result<()> {
    let msr_path = config.msr_root.join("0").join("msr");
    if std::fs::metadata(&msr_path).is_err() {
        return Err(K15Error::ConfigError(format!(
            "Cannot access {}. The MSR kernel module may not be loaded. Run: sudo modprobe msr",
            msr_path.display()
        )));
    }

    if !nix::unistd::Uid::effective().is_root() {
        tracing::warn!("Not running as root, register access will likely be denied");
    }

    Ok(())
}

fn run_cpu<T: RegisterTransport>(
    controller: &mut PStateController<T>,
    core: u32,
    selection: Option<PStateSelection>,
    overrides: &CpuOverrides,
    dry_run: bool,
) -> Result<()> {
    let Some(selection) = selection else {
        print!("{}", render_cpu_table(core, &controller.inspect(core)?));
        return Ok(());
    };

    let update = controller.apply_cpu_update(core, selection, overrides, dry_run)?;
    for warning in &update.warnings {
        tracing::warn!("CPU{core}: {warning}");
    }

    if dry_run {
        let reports = with_cpu_candidate(controller.inspect(core)?, &update);
        print!("{}", render_cpu_table(core, &reports));
    }

    Ok(())
}

fn run_nb<T: RegisterTransport>(
    controller: &mut PStateController<T>,
    node: u32,
    slot: Option<u8>,
    overrides: &NbOverrides,
    dry_run: bool,
) -> Result<()> {
    let Some(slot) = slot else {
        print!("{}", render_nb_table(node, &controller.inspect_nb(node)?));
        return Ok(());
    };

    let update = controller.apply_nb_update(node, slot, overrides, dry_run)?;

    if dry_run {
        let reports = with_nb_candidate(controller.inspect_nb(node)?, &update);
        print!("{}", render_nb_table(node, &reports));
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose);

    // Selection and ranges are validated before any register is touched
    let selection = PStateSelection::from_args(args.pstate, args.boosted_pstate)?;
    let cpus = if args.cpus.is_empty() {
        Vec::new()
    } else {
        parse_range_list(&args.cpus)?
    };
    let nodes = if args.nodes.is_empty() {
        Vec::new()
    } else {
        parse_range_list(&args.nodes)?
    };
    if let Some(&node) = nodes.iter().find(|&&node| node > MAX_NB_NODE) {
        return Err(K15Error::InvalidDevice(format!(
            "Northbridge {node} out of range (0-{MAX_NB_NODE})"
        )));
    }

    let cpu_overrides = args.cpu_overrides();
    let nb_overrides = args.nb_overrides();

    if !cpus.is_empty() && selection.is_none() && !cpu_overrides.is_empty() {
        tracing::warn!("No P-State selected (--p or --bp), CPU field overrides ignored");
    }
    if !nodes.is_empty() && args.nb_pstate.is_none() && !nb_overrides.is_empty() {
        tracing::warn!("No Northbridge P-State selected (--np), NB field overrides ignored");
    }

    let transport_config = TransportConfig::from_env();
    check_permissions(&transport_config)?;

    let mut controller = PStateController::detect(HardwareTransport::new(transport_config))?;

    for &core in &cpus {
        run_cpu(&mut controller, core, selection, &cpu_overrides, args.dry_run)?;
    }

    for &node in &nodes {
        run_nb(&mut controller, node, args.nb_pstate, &nb_overrides, args.dry_run)?;
    }

    Ok(())
}
