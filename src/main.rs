use anyhow::Result;
use clap::Parser;

mod aggregate;
mod classify;
mod cli;
mod fetch;
mod github;
mod model;
mod paginate;
mod render;
mod util;

use crate::cli::{Cli, normalize};

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  // Phase 1: normalize CLI
  let cfg = normalize(cli)?;

  if cfg.token.is_none() {
    eprintln!("[github] No token found (GITHUB_TOKEN / GH_TOKEN); continuing unauthenticated with low rate limits");
  }

  // Phase 2: collect activity over the window
  let client = github::GithubClient::new(&cfg.api_root, cfg.token.clone());
  let fetch_cfg = fetch::FetchConfig {
    user: cfg.user.clone(),
    start: cfg.start.clone(),
    end: cfg.end.clone(),
    throttle: cfg.throttle(),
  };
  let vocab = classify::IncidentVocabulary::default();
  let activity = fetch::Fetcher::new(&client, &fetch_cfg, &vocab).collect()?;

  // Phase 3: aggregate and write the report
  let report = aggregate::build_report(&cfg.user, &cfg.start, &cfg.end, activity);
  let written = render::write_report(&report, &cfg.out)?;
  println!("Wrote {}", written);

  Ok(())
}
