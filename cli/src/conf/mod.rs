use crate::{command_title, display::*, item, loading, prelude::*};

#[derive(Args, Clone, Debug)]
pub(crate) struct ConfCommand {
    #[arg(
        long = "publisher-url",
        help = "Set the Walrus publisher URL",
        value_name = "URL"
    )]
    publisher_url: Option<String>,
    #[arg(
        long = "aggregator-url",
        help = "Set the Walrus aggregator URL",
        value_name = "URL"
    )]
    aggregator_url: Option<String>,
    #[arg(
        long = "timeout-secs",
        help = "Set the request timeout in seconds",
        value_name = "SECS"
    )]
    timeout_secs: Option<u64>,
    #[arg(
        long = "cache.dir",
        help = "Set the blob cache directory",
        value_name = "PATH",
        value_parser = ValueParser::from(expand_tilde)
    )]
    cache_dir: Option<PathBuf>,
    #[arg(
        long = "cache.max-size",
        help = "Set the maximum number of cached blobs",
        value_name = "COUNT"
    )]
    cache_max_size: Option<usize>,
}

/// Handle the provided conf command. The [ConfCommand] instance is passed from
/// [crate::main].
pub(crate) fn handle(
    ConfCommand {
        publisher_url,
        aggregator_url,
        timeout_secs,
        cache_dir,
        cache_max_size,
    }: ConfCommand,
    conf_path: &PathBuf,
) -> AnyResult<(), WalrusCliError> {
    let mut conf = load_conf(conf_path)?;

    // If all fields are None, we just want to display the current configuration.
    if publisher_url.is_none()
        && aggregator_url.is_none()
        && timeout_secs.is_none()
        && cache_dir.is_none()
        && cache_max_size.is_none()
    {
        command_title!("Current Walrus CLI Configuration");

        print_conf(&conf);

        return json_output(&conf);
    }

    command_title!("Updating Walrus CLI Configuration");

    conf.publisher_url = publisher_url.unwrap_or(conf.publisher_url);
    conf.aggregator_url = aggregator_url.unwrap_or(conf.aggregator_url);
    conf.timeout_secs = timeout_secs.unwrap_or(conf.timeout_secs);
    conf.cache.dir = cache_dir.or(conf.cache.dir);
    conf.cache.max_size = cache_max_size.unwrap_or(conf.cache.max_size);

    // Never persist a configuration the client could not be built from.
    conf.validate().map_err(WalrusCliError::Walrus)?;

    let conf_handle = loading!("Updating configuration...");

    match conf.save(conf_path) {
        Ok(()) => {
            conf_handle.success();

            print_conf(&conf);

            json_output(&conf)
        }
        Err(e) => {
            conf_handle.error();

            Err(WalrusCliError::Walrus(e))
        }
    }
}

fn print_conf(conf: &WalrusConfig) {
    item!("Publisher URL: {}", conf.publisher_url.truecolor(100, 100, 100));
    item!("Aggregator URL: {}", conf.aggregator_url.truecolor(100, 100, 100));
    item!("Timeout: {}s", conf.timeout_secs);

    match &conf.cache.dir {
        Some(dir) => item!("Cache dir: {}", dir.display()),
        None => item!("Cache dir: {}", "temporary".truecolor(100, 100, 100)),
    }

    item!("Cache max size: {}", conf.cache.max_size);
}
