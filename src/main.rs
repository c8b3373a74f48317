//! installer-storage - inspect and edit the storage configuration of an installer
//!
//! Works against a backend directory (see `backend::file`) holding the system
//! snapshot and the configuration document.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use installer_storage::api::config::{Collection, SpaceActionValue, SpacePolicy, SpacePolicyAction};
use installer_storage::backend::{FileBackend, StorageBackend};
use installer_storage::config::{Settings, DEFAULT_SETTINGS_FILE};
use installer_storage::describe::{self, drive as drive_text};
use installer_storage::edit::volume_group::vg_name_error;
use installer_storage::menu::{
    AddDeviceAction, AddDeviceMenu, BootChoice, BootDialog, BootMode, DeviceSelection, DeviceSelector,
    EncryptionChoice, EncryptionDialog, Selection, SpacePolicyChoice, SpacePolicyMenu,
};
use installer_storage::model::Model;
use installer_storage::utils::prompt;
use installer_storage::{routes, Outcome, StorageContext, StorageError};

#[derive(Parser)]
#[command(name = "installer-storage")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file (defaults to ./installer-storage.toml when present)
    #[arg(short, long, global = true, env = "INSTALLER_STORAGE_SETTINGS")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the configured devices and what will happen to them
    Show,

    /// Check the configuration document and list backend issues
    Validate,

    /// List devices available for installing
    Devices,

    /// Use an additional drive or RAID
    AddDrive { name: String },

    /// Stop using a drive or RAID
    RemoveDrive { name: String },

    /// Set how to make room on a device
    SpacePolicy {
        name: String,
        policy: String,
        /// Per-partition action for the custom policy, e.g. /dev/sda2=delete
        #[arg(short, long = "action")]
        actions: Vec<String>,
    },

    /// Enable or disable encryption
    Encryption {
        #[command(subcommand)]
        action: EncryptionCommand,
    },

    /// Choose where to set up the partitions for booting
    Boot {
        #[command(subcommand)]
        action: BootCommand,
    },

    /// Stop formatting the whole device
    DeleteFilesystem { name: String },

    /// Move the mount points of the given devices to a new LVM volume group
    Lvm {
        /// Devices to use as physical volumes
        #[arg(required = true)]
        devices: Vec<String>,
        /// Volume group name
        #[arg(short, long, default_value = "system")]
        name: String,
    },

    /// Go back to the default configuration
    Reset,

    /// Show the progress of DASD format jobs
    Jobs,

    /// Edit the configuration through menus
    Interactive,

    /// Generate a sample settings file
    GenerateConfig {
        /// Output path for the settings file
        #[arg(short, long, default_value = DEFAULT_SETTINGS_FILE)]
        output: String,
    },
}

#[derive(Subcommand)]
enum EncryptionCommand {
    Enable {
        /// Read from the terminal when not given
        #[arg(short, long, env = "INSTALLER_STORAGE_PASSWORD")]
        password: Option<String>,
        /// Unlock with the TPM when the system allows it
        #[arg(long)]
        tpm: bool,
    },
    Disable,
}

#[derive(Subcommand)]
enum BootCommand {
    /// Use the installation disk
    Auto,
    /// Use the given disk
    Disk { name: String },
    /// Do not configure boot partitions
    Off,
}

fn init_logging(verbose: bool, level: &str) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(level)
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.settings.as_deref())?;
    init_logging(cli.verbose, &settings.log.level);

    let command = cli.command.unwrap_or(Commands::Show);
    if let Commands::GenerateConfig { output } = &command {
        return cmd_generate_config(output);
    }

    settings.validate()?;
    let backend = FileBackend::open(&settings.backend.dir)?;
    let mut context = StorageContext::new(backend).with_capabilities(settings.capabilities);
    context.load();
    let truncate = settings.ui.truncate_names;

    match command {
        Commands::Show => cmd_show(&context, truncate)?,
        Commands::Validate => cmd_validate(&context)?,
        Commands::Devices => cmd_devices(&context, truncate)?,
        Commands::AddDrive { name } => cmd_add_drive(&context, &name)?,
        Commands::RemoveDrive { name } => cmd_remove_drive(&context, &name)?,
        Commands::SpacePolicy {
            name,
            policy,
            actions,
        } => cmd_space_policy(&context, &name, &policy, &actions)?,
        Commands::Encryption { action } => cmd_encryption(&context, action)?,
        Commands::Boot { action } => cmd_boot(&context, action)?,
        Commands::DeleteFilesystem { name } => {
            report(context.hooks().delete_filesystem(&name)?, "File system removed");
        }
        Commands::Lvm { devices, name } => cmd_lvm(&context, &name, &devices)?,
        Commands::Reset => {
            context.backend().reset_config()?;
            prompt::success("Configuration reset to the defaults");
        }
        Commands::Jobs => cmd_jobs(&context)?,
        Commands::Interactive => cmd_interactive(&mut context, truncate)?,
        Commands::GenerateConfig { .. } => {}
    }

    Ok(())
}

/// Model of the loaded context, or the reason it is missing
fn loaded<'c>(context: &'c StorageContext<FileBackend>) -> Result<Model<'c>> {
    if let Some(e) = context.system.error() {
        bail!("Cannot read the system: {}", e);
    }
    if let Some(e) = context.config.error() {
        bail!("Cannot read the configuration: {}", e);
    }
    context
        .model()
        .ok_or_else(|| anyhow!("Storage information is still loading"))
}

fn report(outcome: Outcome, message: &str) {
    match outcome {
        Outcome::Applied => prompt::success(message),
        Outcome::Skipped => prompt::warn("Nothing to change"),
    }
}

fn cmd_show(context: &StorageContext<FileBackend>, truncate: bool) -> Result<()> {
    let model = loaded(context)?;

    if model.partitionables().next().is_none() && model.volume_groups.is_empty() {
        println!("No devices configured.");
    }

    for device in model.partitionables() {
        let title = match device.device {
            Some(probed) => describe::device_label(probed, truncate),
            None => format!("{} {}", device.name(), "(not found)".red()),
        };
        println!("{}", title.bold());
        if let Some(probed) = device.device {
            println!("  {}: {}", describe::type_description(probed), describe::content_description(probed));
        }
        println!("  {}", drive_text::content_description(device.config));
        if device.has_existing_partitions() {
            println!("  {}", drive_text::content_actions_summary(device));
        }
        if device.is_boot {
            println!("  {}", "Boot partitions will be set up here".cyan());
        }
    }

    for volume_group in &model.volume_groups {
        println!("{} {}", "LVM".bold(), volume_group.vg_name().bold());
        println!("  Physical volumes: {}", volume_group.target_names().join(", "));
        println!("  Mount points: {}", volume_group.get_mount_paths().join(", "));
    }

    println!();
    match &model.config.encryption {
        Some(encryption) => println!("Encryption: {}", encryption.method),
        None => println!("Encryption: disabled"),
    }
    if model.boot.configure {
        let device = model.boot_device().and_then(|d| d.device);
        println!("{}", describe::boot_label(model.boot.is_default, device));
    } else {
        println!("{}", describe::device::BOOT_DISABLED_TEXT);
    }

    print_issues(context);
    Ok(())
}

fn print_issues(context: &StorageContext<FileBackend>) {
    match (context.issues.ready(), context.issues.error()) {
        (Some(issues), _) if !issues.is_empty() => {
            println!();
            for issue in issues {
                prompt::warn(&issue.description);
                if let Some(details) = &issue.details {
                    println!("    {}", details);
                }
            }
        }
        (_, Some(e)) => prompt::error(&format!("Cannot read the issues: {}", e)),
        _ => {}
    }
}

fn cmd_validate(context: &StorageContext<FileBackend>) -> Result<()> {
    let model = loaded(context)?;
    let violations = model.config.validate(Some(model.system));
    for violation in &violations {
        prompt::error(&violation.to_string());
    }
    print_issues(context);

    if !violations.is_empty() {
        bail!("{} problem(s) found in the configuration", violations.len());
    }
    prompt::success("Configuration is valid");
    Ok(())
}

fn cmd_devices(context: &StorageContext<FileBackend>, truncate: bool) -> Result<()> {
    let model = loaded(context)?;
    let devices = model.system.available_devices();
    if devices.is_empty() {
        println!("No suitable devices found.");
        return Ok(());
    }

    println!("{:<20} {:>10} {:<16} {:<5} {}", "DEVICE", "SIZE", "TYPE", "USED", "CONTENT");
    println!("{}", "-".repeat(78));

    for device in devices {
        let used = model.find_partitionable(&device.name).is_some();
        println!(
            "{:<20} {:>10} {:<16} {:<5} {}",
            describe::base_name(&device.name, truncate),
            device.size().and_then(describe::format_size).unwrap_or_default(),
            describe::type_description(device),
            if used { "yes".green() } else { "no".normal() },
            describe::content_description(device)
        );
        let labels = describe::filesystem_labels(device);
        if !labels.is_empty() {
            println!("{:<20} labels: {}", "", labels.join(", "));
        }
    }

    Ok(())
}

fn cmd_add_drive(context: &StorageContext<FileBackend>, name: &str) -> Result<()> {
    let model = loaded(context)?;
    let device = model
        .system
        .find_device_by_name(name)
        .ok_or_else(|| StorageError::DeviceNotFound(name.to_string()))?;

    let outcome = if device.is_md_raid() {
        context.hooks().add_md_raid(name)?
    } else {
        context.hooks().add_drive(name)?
    };
    report(outcome, &format!("{} added", name));
    Ok(())
}

fn cmd_remove_drive(context: &StorageContext<FileBackend>, name: &str) -> Result<()> {
    let model = loaded(context)?;
    let outcome = match model.find_partitionable(name).map(|d| d.list) {
        Some(Collection::MdRaids) => context.hooks().remove_md_raid(name)?,
        _ => context.hooks().remove_drive(name)?,
    };
    report(outcome, &format!("{} removed", name));
    Ok(())
}

fn parse_action(spec: &str) -> Result<SpacePolicyAction> {
    let (device_name, value) = spec
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected DEVICE=ACTION, got '{}'", spec))?;
    Ok(SpacePolicyAction {
        device_name: device_name.to_string(),
        value: value.parse::<SpaceActionValue>()?,
    })
}

fn cmd_space_policy(context: &StorageContext<FileBackend>, name: &str, policy: &str, actions: &[String]) -> Result<()> {
    let policy: SpacePolicy = policy.parse()?;
    let actions = actions
        .iter()
        .map(|a| parse_action(a))
        .collect::<Result<Vec<_>>>()?;
    if !actions.is_empty() && policy != SpacePolicy::Custom {
        bail!("Per-partition actions need the custom policy");
    }

    let outcome = context.hooks().set_space_policy(name, policy, &actions)?;
    report(
        outcome,
        &format!("{}: {}", name, drive_text::space_policy_entry(policy).label),
    );
    Ok(())
}

fn cmd_encryption(context: &StorageContext<FileBackend>, action: EncryptionCommand) -> Result<()> {
    let model = loaded(context)?;
    let mut dialog = EncryptionDialog::new(model.system);
    dialog.open(model.config);

    if let Some(settings) = dialog.settings_mut() {
        match action {
            EncryptionCommand::Disable => settings.enabled = false,
            EncryptionCommand::Enable { password, tpm } => {
                settings.enabled = true;
                settings.use_tpm = tpm;
                if tpm && !settings.tpm_supported() {
                    prompt::warn("TPM-based encryption is not available, using LUKS2");
                }
                match password {
                    Some(password) => {
                        settings.confirmation = password.clone();
                        settings.password = password;
                    }
                    None => {
                        settings.password = prompt::prompt_password("Encryption password")?;
                        settings.confirmation = prompt::prompt_password("Confirm password")?;
                    }
                }
                if let Some(e) = settings.password_error() {
                    bail!("{}", e);
                }
            }
        }
    }

    apply_encryption(context, dialog.confirm())
}

fn apply_encryption(context: &StorageContext<FileBackend>, choice: Option<EncryptionChoice>) -> Result<()> {
    match choice {
        Some(EncryptionChoice::Enabled { method, password }) => {
            report(context.hooks().set_encryption(method, &password)?, &format!("{} encryption enabled", method));
        }
        Some(EncryptionChoice::Disabled) => {
            report(context.hooks().disable_encryption()?, "Encryption disabled");
        }
        None => {}
    }
    Ok(())
}

fn cmd_boot(context: &StorageContext<FileBackend>, action: BootCommand) -> Result<()> {
    let model = loaded(context)?;
    let mut dialog = BootDialog::new();
    dialog.open(&model);

    if let Some(selection) = dialog.selection_mut() {
        match &action {
            BootCommand::Auto => selection.set_mode(BootMode::Automatic),
            BootCommand::Off => selection.set_mode(BootMode::Disabled),
            BootCommand::Disk { name } => {
                if !selection.set_device(name) {
                    bail!("{} is not available for booting", name);
                }
            }
        }
    }

    apply_boot(context, dialog.confirm())
}

fn apply_boot(context: &StorageContext<FileBackend>, choice: Option<BootChoice>) -> Result<()> {
    let outcome = match choice {
        Some(BootChoice::Automatic) => context.hooks().set_default_boot_device()?,
        Some(BootChoice::Device(name)) => context.hooks().set_boot_device(&name)?,
        Some(BootChoice::Disabled) => context.hooks().disable_boot()?,
        None => return Ok(()),
    };
    report(outcome, "Boot settings updated");
    Ok(())
}

fn cmd_lvm(context: &StorageContext<FileBackend>, vg_name: &str, devices: &[String]) -> Result<()> {
    let model = loaded(context)?;
    if let Some(e) = vg_name_error(model.config, vg_name, None) {
        bail!("{}", e);
    }
    for device in devices {
        if model.find_partitionable(device).is_none() {
            bail!("{} is not configured; add it first", device);
        }
    }

    let targets: Vec<&str> = devices.iter().map(String::as_str).collect();
    report(
        context.hooks().convert_to_volume_group(vg_name, &targets)?,
        &format!("Volume group {} created", vg_name),
    );
    Ok(())
}

fn cmd_jobs(context: &StorageContext<FileBackend>) -> Result<()> {
    let jobs = match (context.jobs.ready(), context.jobs.error()) {
        (Some(jobs), _) => jobs,
        (_, Some(e)) => bail!("Cannot read the format jobs: {}", e),
        _ => bail!("Format jobs are still loading"),
    };
    if jobs.is_empty() {
        println!("No format jobs.");
        return Ok(());
    }

    let style = ProgressStyle::default_bar()
        .template("{prefix:>12} [{bar:40.cyan/blue}] {pos}/{len} cylinders {msg}")
        .context("invalid progress template")?
        .progress_chars("=> ");
    let bars = MultiProgress::new();

    for job in jobs {
        info!("Format job {}", job.id);
        for device in &job.devices {
            let bar = bars.add(ProgressBar::new(device.total_cylinders));
            bar.set_style(style.clone());
            bar.set_prefix(device.channel.clone());
            bar.set_position(device.formatted_cylinders);
            if device.done {
                bar.finish_with_message("done");
            } else {
                bar.abandon_with_message(if job.running { "formatting" } else { "stopped" });
            }
        }
    }
    Ok(())
}

fn cmd_generate_config(output: &str) -> Result<()> {
    let content = Settings::sample().to_toml()?;
    std::fs::write(output, content)?;
    prompt::success(&format!("Sample settings written to {}", output));
    Ok(())
}

const SPACE_ACTIONS: [SpaceActionValue; 3] = [
    SpaceActionValue::Keep,
    SpaceActionValue::Delete,
    SpaceActionValue::ResizeIfNeeded,
];
const SPACE_ACTION_LABELS: [&str; 3] = ["Do not modify", "Delete", "Allow shrink"];

const MAIN_MENU: [&str; 7] = [
    "Add a device",
    "Change space policy",
    "Switch device",
    "Encryption",
    "Boot",
    "Reset",
    "Quit",
];

fn cmd_interactive(context: &mut StorageContext<FileBackend>, truncate: bool) -> Result<()> {
    loop {
        context.poll_events();
        cmd_show(context, truncate)?;
        if let Some(e) = context.activation_error() {
            prompt::error(e);
            context.dismiss_activation_error();
        }
        println!();

        let choice = match prompt::prompt_select("What do you want to do?", &MAIN_MENU, 0) {
            Ok(choice) => choice,
            Err(StorageError::UserCancelled) => break,
            Err(e) => return Err(e.into()),
        };

        let result = match choice {
            0 => interactive_add_device(context),
            1 => interactive_space_policy(context),
            2 => interactive_switch_device(context),
            3 => interactive_encryption(context),
            4 => interactive_boot(context),
            5 => context.backend().reset_config().map_err(Into::into),
            _ => break,
        };

        match result {
            Err(e) if matches!(e.downcast_ref::<StorageError>(), Some(StorageError::UserCancelled)) => {}
            other => other?,
        }
    }
    Ok(())
}

/// Let the user pick one of the configured devices
fn choose_configured(context: &StorageContext<FileBackend>, prompt_text: &str) -> Result<String> {
    let model = loaded(context)?;
    let names: Vec<&str> = model.partitionables().map(|d| d.name()).collect();
    if names.is_empty() {
        bail!("No devices configured");
    }
    let index = prompt::prompt_select(prompt_text, &names, 0)?;
    Ok(names[index].to_string())
}

fn interactive_add_device(context: &mut StorageContext<FileBackend>) -> Result<()> {
    let mut menu = {
        let model = loaded(context)?;
        AddDeviceMenu::build(&model, context.capabilities())
    };

    let labels: Vec<String> = menu
        .items()
        .iter()
        .map(|item| format!("{} - {}", item.label(), item.description().dimmed()))
        .collect();
    let item = menu.items()[prompt::prompt_select("Configure a device", &labels, 0)?];

    let action = match menu.activate(item) {
        Some(action) => Some(action),
        None => {
            let devices: Vec<String> = menu.unused_devices().map(str::to_string).collect();
            let index = prompt::prompt_select("Use additional disk", &devices, 0)?;
            menu.select(&devices[index]);
            menu.confirm()
        }
    };

    match action {
        Some(AddDeviceAction::AddDevice { name, list }) => {
            let outcome = match list {
                Collection::Drives => context.hooks().add_drive(&name)?,
                Collection::MdRaids => context.hooks().add_md_raid(&name)?,
            };
            report(outcome, &format!("{} added", name));
        }
        Some(AddDeviceAction::Navigate(route)) => interactive_page(context, route)?,
        None => {}
    }
    Ok(())
}

/// Pages reached from the add-device menu
fn interactive_page(context: &mut StorageContext<FileBackend>, route: &str) -> Result<()> {
    match route {
        routes::ADD_VOLUME_GROUP => {
            let (mut selection, default_name) = {
                let model = loaded(context)?;
                let candidates: Vec<String> = model.partitionables().map(|d| d.name().to_string()).collect();
                let taken = model.volume_groups.len();
                let name = if taken == 0 {
                    "system".to_string()
                } else {
                    format!("system{}", taken)
                };
                (DeviceSelection::multiple(candidates, &[]), name)
            };
            if selection.candidates().is_empty() {
                bail!("Add a device before creating a volume group");
            }

            let vg_name = prompt::prompt_input("Volume group name", Some(&default_name))?;
            let candidates = selection.candidates().to_vec();
            let checked = vec![false; candidates.len()];
            for index in prompt::prompt_multi_select("Physical volumes", &candidates, &checked)? {
                selection.select(&candidates[index]);
            }
            match selection.resolve() {
                Some(devices) => cmd_lvm(context, &vg_name, &devices)?,
                None => prompt::warn("Select at least one device"),
            }
        }
        routes::ISCSI => {
            let target = prompt::prompt_input("iSCSI target name", None)?;
            if context.login_iscsi(&target).is_ok() {
                prompt::success(&format!("Logged into {}", target));
            }
        }
        routes::ZFCP => {
            let channel = prompt::prompt_input("Channel", None)?;
            let wwpn = prompt::prompt_input("WWPN", None)?;
            let lun = prompt::prompt_input("LUN", None)?;
            if context.activate_zfcp(&channel, &wwpn, &lun).is_ok() {
                prompt::success("zFCP disk activated");
            }
        }
        routes::DASD => {
            let channel = prompt::prompt_input("DASD channel", None)?;
            if context.activate_dasd(&channel).is_ok() {
                prompt::success(&format!("DASD {} activated", channel));
            }
        }
        other => prompt::warn(&format!("{} cannot be shown here", other)),
    }
    Ok(())
}

fn interactive_space_policy(context: &mut StorageContext<FileBackend>) -> Result<()> {
    let name = choose_configured(context, "Device")?;
    let (mut menu, partitions) = {
        let model = loaded(context)?;
        let device = model
            .find_partitionable(&name)
            .ok_or_else(|| StorageError::DeviceNotFound(name.clone()))?;
        let Some(menu) = SpacePolicyMenu::build(device) else {
            prompt::warn(&format!("{} has no partitions to make room from", name));
            return Ok(());
        };
        let partitions: Vec<(String, String)> = device
            .device
            .map(|d| d.partitions.iter().map(|p| (p.name.clone(), describe::device_label(p, false))).collect())
            .unwrap_or_default();
        (menu, partitions)
    };

    menu.open();
    let entries: Vec<String> = menu
        .entries()
        .map(|(entry, current)| {
            if current {
                format!("{} (current)", entry.label)
            } else {
                entry.label.to_string()
            }
        })
        .collect();
    let index = prompt::prompt_select("Find space", &entries, 0)?;
    let policy = drive_text::SPACE_POLICIES[index].id;

    match menu.choose(policy)? {
        Some(SpacePolicyChoice::Apply(policy)) => {
            report(context.hooks().set_space_policy(&name, policy, &[])?, "Space policy updated");
        }
        Some(SpacePolicyChoice::Navigate(path)) => {
            info!("Editing space actions ({})", path);
            let mut actions = Vec::new();
            for (partition, label) in partitions {
                let value = SPACE_ACTIONS[prompt::prompt_select(&label, &SPACE_ACTION_LABELS, 0)?];
                actions.push(SpacePolicyAction {
                    device_name: partition,
                    value,
                });
            }
            report(
                context.hooks().set_space_policy(&name, SpacePolicy::Custom, &actions)?,
                "Space actions updated",
            );
        }
        None => {}
    }
    Ok(())
}

fn interactive_switch_device(context: &mut StorageContext<FileBackend>) -> Result<()> {
    let name = choose_configured(context, "Device to replace")?;
    let mut selector = {
        let model = loaded(context)?;
        let device = model
            .find_partitionable(&name)
            .ok_or_else(|| StorageError::DeviceNotFound(name.clone()))?;
        DeviceSelector::new(&model, device)
    };

    selector.open();
    let candidates: Vec<String> = selector
        .dialog()
        .selection()
        .map(|s| s.candidates().to_vec())
        .unwrap_or_default();
    let current = candidates.iter().position(|c| *c == name).unwrap_or(0);
    let index = prompt::prompt_select("Install using", &candidates, current)?;
    selector.select(&candidates[index]);

    if let Some(target) = selector.confirm() {
        report(
            context.hooks().switch_device(&target.from, &target.to, target.collection)?,
            &format!("Using {} instead of {}", target.to, target.from),
        );
    }
    Ok(())
}

fn interactive_encryption(context: &mut StorageContext<FileBackend>) -> Result<()> {
    let mut dialog = {
        let model = loaded(context)?;
        let mut dialog = EncryptionDialog::new(model.system);
        dialog.open(model.config);
        dialog
    };

    if let Some(settings) = dialog.settings_mut() {
        settings.enabled = prompt::prompt_confirm("Encrypt the system?", settings.enabled)?;
        if settings.enabled {
            if settings.tpm_supported() {
                settings.use_tpm = prompt::prompt_confirm("Unlock with the TPM?", settings.use_tpm)?;
            }
            settings.password = prompt::prompt_password("Password")?;
            settings.confirmation = prompt::prompt_password("Password confirmation")?;
            if let Some(e) = settings.password_error() {
                prompt::error(e);
                dialog.cancel();
            }
        }
    }

    apply_encryption(context, dialog.confirm())
}

fn interactive_boot(context: &mut StorageContext<FileBackend>) -> Result<()> {
    let mut dialog = {
        let model = loaded(context)?;
        let mut dialog = BootDialog::new();
        dialog.open(&model);
        dialog
    };

    let modes = [
        "Automatic (installation disk)",
        "Select a disk",
        "Do not configure",
    ];
    if let Some(selection) = dialog.selection_mut() {
        let current = match selection.mode() {
            BootMode::Automatic => 0,
            BootMode::Manual => 1,
            BootMode::Disabled => 2,
        };
        match prompt::prompt_select("Boot options", &modes, current)? {
            0 => selection.set_mode(BootMode::Automatic),
            1 => {
                let candidates = selection.candidates().to_vec();
                let current = selection
                    .device()
                    .and_then(|d| candidates.iter().position(|c| c == d))
                    .unwrap_or(0);
                let index = prompt::prompt_select("Disk", &candidates, current)?;
                selection.set_device(&candidates[index]);
            }
            _ => selection.set_mode(BootMode::Disabled),
        }
    }

    apply_boot(context, dialog.confirm())
}
