//! Table, JSON and CSV output for each command

use crate::OutputFormat;
use anyhow::Result;
use comfy_table::{ContentArrangement, Table};
use ownership_explorer::details::{CompanyDetails, MergedBreakdown, ShareholderDetails};
use ownership_explorer::{
    FilteredGraph, InfluentialShareholder, NodeDetails, Rollup, Session, ViewStatistics,
};
use serde::Serialize;

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header.to_vec());
    table
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn csv_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn print_csv(header: &[&str], rows: &[Vec<String>]) {
    println!("{}", header.join(","));
    for row in rows {
        let cells: Vec<String> = row.iter().map(|c| csv_field(c)).collect();
        println!("{}", cells.join(","));
    }
}

fn print_rows(header: &[&str], rows: Vec<Vec<String>>, format: &OutputFormat) {
    match format {
        OutputFormat::Csv => print_csv(header, &rows),
        _ => {
            if rows.is_empty() {
                println!("(no results)");
                return;
            }
            let count = rows.len();
            let mut t = table(header);
            for row in rows {
                t.add_row(row);
            }
            println!("{}", t);
            println!("{} row(s)", count);
        }
    }
}

fn amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn percent(value: f64) -> String {
    format!("{:.2}%", value)
}

pub fn graph(graph: &FilteredGraph, format: &OutputFormat) -> Result<()> {
    if let OutputFormat::Json = format {
        return print_json(graph);
    }

    let nodes = graph
        .nodes
        .iter()
        .map(|n| {
            let kind = if n.merged {
                "merged"
            } else if n.node.is_company() {
                "company"
            } else {
                "shareholder"
            };
            vec![
                n.id().to_string(),
                kind.to_string(),
                n.node.name().to_string(),
                n.edge_count.map(|c| c.to_string()).unwrap_or_default(),
            ]
        })
        .collect();
    print_rows(&["id", "type", "name", "edges"], nodes, format);

    let links = graph
        .links
        .iter()
        .map(|l| {
            vec![
                l.source.to_string(),
                l.target.to_string(),
                amount(l.shares),
                percent(l.percentage),
                l.original_links.len().to_string(),
            ]
        })
        .collect();
    print_rows(&["source", "target", "shares", "percentage", "combined"], links, format);

    if graph.skipped_links > 0 {
        eprintln!("{} link(s) skipped: endpoint not in dataset", graph.skipped_links);
    }
    Ok(())
}

pub fn rollup(rollup: &Rollup, format: &OutputFormat) -> Result<()> {
    if let OutputFormat::Json = format {
        return print_json(rollup);
    }

    let rows = rollup
        .iter()
        .enumerate()
        .map(|(rank, e)| {
            vec![
                (rank + 1).to_string(),
                e.id.to_string(),
                e.name.clone(),
                amount(e.shares),
                percent(e.percentage),
                e.companies.join(" "),
            ]
        })
        .collect();
    print_rows(&["#", "id", "name", "shares", "percentage", "companies"], rows, format);
    Ok(())
}

pub fn influential(ranking: &[InfluentialShareholder], format: &OutputFormat) -> Result<()> {
    if let OutputFormat::Json = format {
        return print_json(&ranking);
    }

    let rows = ranking
        .iter()
        .enumerate()
        .map(|(rank, s)| {
            let tickers: Vec<&str> = s.holdings.iter().map(|h| h.ticker.as_str()).collect();
            vec![
                (rank + 1).to_string(),
                s.name.clone(),
                s.company_count.to_string(),
                amount(s.total_shares),
                tickers.join(" "),
            ]
        })
        .collect();
    print_rows(&["#", "name", "companies", "total shares", "holdings"], rows, format);
    Ok(())
}

pub fn details(details: &NodeDetails, format: &OutputFormat) -> Result<()> {
    if let OutputFormat::Json = format {
        return print_json(details);
    }

    match details {
        NodeDetails::Company(company) => company_details(company, format),
        NodeDetails::Shareholder(holder) => shareholder_details(holder, format),
        NodeDetails::Merged(breakdown) => merged_details(breakdown, format),
    }
    Ok(())
}

fn company_details(company: &CompanyDetails, format: &OutputFormat) {
    if !matches!(format, OutputFormat::Csv) {
        println!("{} ({})", company.name, company.ticker);
        println!("Total shares: {}", amount(company.total_shares));
    }
    let rows = company
        .holders
        .iter()
        .map(|h| vec![h.name.clone(), amount(h.shares), percent(h.percentage)])
        .collect();
    print_rows(&["holder", "shares", "percentage"], rows, format);
}

fn shareholder_details(holder: &ShareholderDetails, format: &OutputFormat) {
    if !matches!(format, OutputFormat::Csv) {
        match &holder.shareholder_id {
            Some(external) => println!("{} [{}]", holder.name, external),
            None => println!("{}", holder.name),
        }
    }
    let rows = holder
        .holdings
        .iter()
        .map(|h| vec![h.ticker.clone(), h.name.clone(), amount(h.shares), percent(h.percentage)])
        .collect();
    print_rows(&["ticker", "company", "shares", "percentage"], rows, format);
}

fn merged_details(breakdown: &MergedBreakdown, format: &OutputFormat) {
    if !matches!(format, OutputFormat::Csv) {
        println!("{} (merge group {})", breakdown.name, breakdown.group);
    }
    let rows = breakdown
        .rows
        .iter()
        .map(|r| {
            let members: Vec<String> = r
                .contributions
                .iter()
                .map(|c| format!("{}={}", c.shareholder, amount(c.shares)))
                .collect();
            vec![
                r.company.to_string(),
                amount(r.shares),
                percent(r.percentage),
                members.join(" "),
            ]
        })
        .collect();
    print_rows(&["company", "shares", "percentage", "members"], rows, format);
}

pub fn company_hits(session: &Session, term: &str, format: &OutputFormat) -> Result<()> {
    let hits = session.search_companies(term);
    if let OutputFormat::Json = format {
        return print_json(&hits);
    }

    let selected = session.selection().companies();
    let rows = hits
        .iter()
        .map(|c| {
            vec![
                if selected.contains(&c.id) { "*" } else { "" }.to_string(),
                c.id.to_string(),
                session.highlight(&c.ticker, term),
                session.highlight(&c.name, term),
            ]
        })
        .collect();
    print_rows(&["", "id", "ticker", "name"], rows, format);
    Ok(())
}

pub fn shareholder_hits(session: &Session, term: &str, format: &OutputFormat) -> Result<()> {
    let hits = session.search_shareholders(term);
    if let OutputFormat::Json = format {
        return print_json(&hits);
    }

    let rows = hits
        .iter()
        .map(|e| {
            vec![
                e.id.to_string(),
                session.highlight(&e.name, term),
                amount(e.shares),
                percent(e.percentage),
            ]
        })
        .collect();
    print_rows(&["id", "name", "shares", "percentage"], rows, format);
    Ok(())
}

pub fn stats(stats: &ViewStatistics, dangling: usize, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(stats)?,
        _ => {
            println!("Companies:     {}", stats.companies);
            println!("Shareholders:  {}", stats.shareholders);
            println!("Relations:     {}", stats.relations);
            println!("Visible nodes: {}", stats.visible_nodes);
            println!("Visible links: {}", stats.visible_links);
            if dangling > 0 {
                println!("Dangling links: {}", dangling);
            }
        }
    }
    Ok(())
}
