//! A small CLI exercising the identity and address-pool cores: parse
//! arguments with `clap`, call into the library, print results with a
//! `DisplayWrapper`.
use log::debug;

use ikecore::error::{CoreError, CoreResult};
use ikecore::identity;
use ikecore::pool::{self, AuthMethod, LeaseRequest};

mod args;
use args::{CliOptions, Mode};

mod display;
use display::DisplayWrapper;

fn main() -> CoreResult<()> {
    env_logger::init();

    let options = CliOptions::options()?;
    debug!("options: {:?}", &options);

    match options.mode {
        Mode::Identity => run_identity(&options),
        Mode::Pool => run_pool(&options),
    }
}

fn run_identity(options: &CliOptions) -> CoreResult<()> {
    let text = options
        .text
        .as_deref()
        .ok_or_else(|| CoreError::malformed("mode=identity requires --text"))?;

    let id = identity::parse(text, options.oe_only)?;
    if options.debug {
        eprintln!("{:#?}", id);
    }
    println!("{}", DisplayWrapper(&id));
    Ok(())
}

fn run_pool(options: &CliOptions) -> CoreResult<()> {
    let start = options.start.ok_or_else(|| CoreError::malformed("mode=pool requires --start"))?;
    let end = options.end.ok_or_else(|| CoreError::malformed("mode=pool requires --end"))?;
    if options.ids.is_empty() {
        return Err(CoreError::malformed("mode=pool requires at least one --id"));
    }

    let id = pool::install_addresspool((start, end))?;
    println!("installed pool {:?}: {}-{}", id, start, end);

    let mut leased = Vec::new();
    for text in &options.ids {
        let peer = identity::parse(text, false)?;
        let req = LeaseRequest::new(&peer, AuthMethod::Certificate, options.unique_ids);
        let addr = pool::with_pool(id, |p| pool::lease_an_address(p, &req))?;
        println!("leased {addr} for '{text}'");
        leased.push((text.clone(), addr));
    }

    if let Some((first_name, first_addr)) = leased.first().cloned() {
        pool::with_pool(id, |p| pool::rel_lease_addr(p, first_addr));
        println!("released {first_addr} (was '{first_name}')");

        let peer = identity::parse(&first_name, false)?;
        let req = LeaseRequest::new(&peer, AuthMethod::Certificate, options.unique_ids);
        let reacquired = pool::with_pool(id, |p| pool::lease_an_address(p, &req))?;
        println!("re-leased {reacquired} for '{first_name}' (reused prior address: {})", reacquired == first_addr);
    }

    pool::with_pool(id, |p| println!("{}", DisplayWrapper(p)));

    pool::unreference_addresspool(id);
    Ok(())
}
