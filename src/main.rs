// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Paperdock-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Paperdock and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Paperdock CLI entrypoint.
//!
//! By default this serves MCP over stdio (intended for tool integrations).
//!
//! Use `--http` to serve streamable HTTP at `http://0.0.0.0:<port>/mcp` plus
//! SSE at `/sse` and `/messages` instead.

use std::error::Error;

use tracing_subscriber::EnvFilter;

const DEFAULT_HTTP_PORT: u16 = 3000;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--base-url <url>] [--token <token>]\n  {program} [--base-url <url>] [--token <token>] --http [--port <port>]\n\nStdio mode (default) runs one MCP session on stdin/stdout.\n--http serves streamable HTTP at `http://0.0.0.0:<port>/mcp` plus SSE at `/sse`\nand `/messages`. --port selects the port (default {DEFAULT_HTTP_PORT}).\n\nIf --base-url/--token are omitted, the PAPERLESS_URL and API_KEY environment\nvariables are used. Both are required."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    base_url: Option<String>,
    token: Option<String>,
    http: bool,
    port: Option<u16>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--base-url" => {
                if options.base_url.is_some() {
                    return Err(());
                }
                let url = args.next().ok_or(())?;
                options.base_url = Some(url);
            }
            "--token" => {
                if options.token.is_some() {
                    return Err(());
                }
                let token = args.next().ok_or(())?;
                options.token = Some(token);
            }
            "--http" => {
                if options.http {
                    return Err(());
                }
                options.http = true;
            }
            "--port" => {
                if options.port.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                let port: u16 = raw.parse().map_err(|_| ())?;
                options.port = Some(port);
            }
            _ => return Err(()),
        }
    }

    if options.port.is_some() && !options.http {
        return Err(());
    }

    Ok(options)
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "paperdock".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        // Stdout belongs to the stdio transport; diagnostics go to stderr.
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(std::io::stderr)
            .init();

        let base_url = options.base_url.or_else(|| std::env::var("PAPERLESS_URL").ok());
        let token = options.token.or_else(|| std::env::var("API_KEY").ok());
        let (Some(base_url), Some(token)) = (base_url, token) else {
            print_usage(&program);
            std::process::exit(1);
        };

        let client = paperdock::api::PaperlessClient::new(base_url, token)?;
        let mcp = paperdock::mcp::PaperdockMcp::new(client);

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

        if options.http {
            runtime.block_on(mcp.serve_http(options.port.unwrap_or(DEFAULT_HTTP_PORT)))?;
        } else {
            runtime.block_on(mcp.serve_stdio())?;
        }
        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("paperdock: {err}");
        std::process::exit(1);
    }
}
