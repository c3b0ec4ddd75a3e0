//! Plain-text ledger parser
//!
//! Reads a beancount-style subset: dated transactions with indented postings.
//!
//! ```text
//! ; weekly shopping
//! 2025-01-05 * "Supermarket" "Weekly shop"
//!   Expenses:Food:Groceries     200.00 CNY
//!   Assets:Bank:Checking
//! ```
//!
//! One posting per transaction may leave its amount out; it receives the
//! balancing amount. Other directives (`open`, `balance`, `price`, options and
//! so on) are skipped.
//!
//! Amounts may carry any number of decimals and a cost (`{150.00 USD}`,
//! `{{300.00 USD}}`) or a price (`@ 7.10 CNY`, `@@ 710.00 CNY`). A record
//! balances when the weights of its postings sum to zero per currency once
//! rounded to the cent. The weight is the cost if there is one, else the
//! price, else the amount itself. Posted amounts are rounded to the cent.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{TallyError, TallyResult};
use crate::models::{Money, Posting, Record};

/// A quantity in one currency
#[derive(Debug, Clone)]
struct Quantity {
    number: Decimal,
    currency: String,
}

/// A written amount and the weight it contributes to the balance
///
/// The weight is `None` for an empty cost (`{}`), which leaves the record
/// unchecked.
struct PostedAmount {
    units: Quantity,
    weight: Option<Quantity>,
}

/// A posting whose amount may still be elided
struct PendingPosting {
    account: String,
    amount: Option<PostedAmount>,
    line: usize,
}

struct PendingRecord {
    record: Record,
    postings: Vec<PendingPosting>,
    line: usize,
}

fn to_cents(number: Decimal) -> Decimal {
    let mut rounded = number.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

impl PendingRecord {
    fn finish(self) -> TallyResult<Record> {
        let PendingRecord {
            mut record,
            mut postings,
            line,
        } = self;

        if postings.is_empty() {
            return Err(TallyError::ledger(line, "transaction has no postings"));
        }

        let elided: Vec<usize> = postings
            .iter()
            .enumerate()
            .filter(|(_, p)| p.amount.is_none())
            .map(|(i, _)| i)
            .collect();

        if elided.len() > 1 {
            return Err(TallyError::ledger(
                postings[elided[1]].line,
                "only one posting per transaction may omit its amount",
            ));
        }

        let mut weights: BTreeMap<String, Decimal> = BTreeMap::new();
        let mut unknown_weight = false;
        for amount in postings.iter().filter_map(|p| p.amount.as_ref()) {
            match &amount.weight {
                Some(weight) => {
                    let sum = weights.entry(weight.currency.clone()).or_default();
                    *sum = sum
                        .checked_add(weight.number)
                        .ok_or_else(|| TallyError::ledger(line, "amount out of range"))?;
                }
                None => unknown_weight = true,
            }
        }

        let residual: Vec<(String, Decimal)> = weights
            .iter()
            .map(|(currency, sum)| (currency.clone(), to_cents(*sum)))
            .filter(|(_, sum)| !sum.is_zero())
            .collect();

        if let Some(&index) = elided.first() {
            if unknown_weight {
                return Err(TallyError::ledger(
                    postings[index].line,
                    "cannot infer an elided amount next to a cost without an amount",
                ));
            }
            let balancing = match residual.as_slice() {
                [] => {
                    let currency = postings
                        .iter()
                        .find_map(|p| p.amount.as_ref())
                        .map(|a| a.units.currency.clone())
                        .ok_or_else(|| {
                            TallyError::ledger(line, "cannot infer the currency of an elided amount")
                        })?;
                    Quantity {
                        number: Decimal::ZERO,
                        currency,
                    }
                }
                [(currency, sum)] => Quantity {
                    number: -*sum,
                    currency: currency.clone(),
                },
                _ => {
                    return Err(TallyError::ledger(
                        postings[index].line,
                        "cannot balance an elided amount across several currencies",
                    ));
                }
            };
            postings[index].amount = Some(PostedAmount {
                weight: Some(balancing.clone()),
                units: balancing,
            });
        } else if !unknown_weight {
            if let Some((currency, sum)) = residual.first() {
                return Err(TallyError::ledger(
                    line,
                    format!("transaction does not balance: {} {}", sum, currency),
                ));
            }
        }

        let mut complete = Vec::with_capacity(postings.len());
        for posting in postings {
            let Some(PostedAmount { units, .. }) = posting.amount else {
                continue;
            };
            let amount = Money::from_decimal(units.number)
                .ok_or_else(|| TallyError::ledger(posting.line, "amount out of range"))?;
            if amount.to_decimal() != units.number {
                debug!(
                    line = posting.line,
                    written = %units.number,
                    posted = %amount,
                    "Rounded ledger amount to the cent"
                );
            }
            complete.push(Posting::new(posting.account, amount, units.currency));
        }
        record.postings = complete;

        Ok(record)
    }
}

/// Parse a whole ledger into records
pub fn parse_ledger(text: &str) -> TallyResult<Vec<Record>> {
    let mut records = Vec::new();
    let mut pending: Option<PendingRecord> = None;

    for (index, raw_line) in text.lines().enumerate() {
        let line_number = index + 1;
        let trimmed = raw_line.trim();

        if trimmed.is_empty() {
            if let Some(record) = pending.take() {
                records.push(record.finish()?);
            }
            continue;
        }

        if trimmed.starts_with(';') || trimmed.starts_with('#') {
            continue;
        }

        let indented = raw_line.starts_with(' ') || raw_line.starts_with('\t');

        if !indented {
            if let Some(record) = pending.take() {
                records.push(record.finish()?);
            }
            pending = parse_header(trimmed, line_number)?;
            continue;
        }

        if let Some(record) = pending.as_mut() {
            if let Some(posting) = parse_posting(trimmed, line_number)? {
                record.postings.push(posting);
            }
        }
    }

    if let Some(record) = pending.take() {
        records.push(record.finish()?);
    }

    Ok(records)
}

/// Parse a non-indented line; returns a pending record for transactions
fn parse_header(line: &str, line_number: usize) -> TallyResult<Option<PendingRecord>> {
    let mut parts = line.splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or_default();
    let rest = parts.next().unwrap_or_default().trim_start();

    let date = match NaiveDate::parse_from_str(first, "%Y-%m-%d") {
        Ok(date) => date,
        // option, include, pushtag and friends
        Err(_) => return Ok(None),
    };

    let keyword = rest.split_whitespace().next().unwrap_or_default();
    if !matches!(keyword, "*" | "!" | "txn") {
        return Ok(None);
    }

    let strings = quoted_strings(&rest[keyword.len()..], line_number)?;
    let (payee, narration) = match strings.len() {
        0 => (None, None),
        1 => (None, Some(strings[0].clone())),
        _ => (Some(strings[0].clone()), Some(strings[1].clone())),
    };

    let mut record = Record::new(date, Vec::new());
    record.payee = payee;
    record.narration = narration;

    Ok(Some(PendingRecord {
        record,
        postings: Vec::new(),
        line: line_number,
    }))
}

fn quoted_strings(text: &str, line_number: usize) -> TallyResult<Vec<String>> {
    let mut strings = Vec::new();
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                let mut value = String::new();
                let mut closed = false;
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                value.push(escaped);
                            }
                        }
                        '"' => {
                            closed = true;
                            break;
                        }
                        other => value.push(other),
                    }
                }
                if !closed {
                    return Err(TallyError::ledger(line_number, "unterminated string"));
                }
                strings.push(value);
            }
            ';' => break,
            _ => {}
        }
    }

    Ok(strings)
}

/// Parse an indented line; metadata lines yield `None`
fn parse_posting(line: &str, line_number: usize) -> TallyResult<Option<PendingPosting>> {
    let content = line.split(';').next().unwrap_or_default();
    let mut tokens = content.split_whitespace().peekable();

    if matches!(tokens.peek(), Some(&"*") | Some(&"!")) {
        tokens.next();
    }

    let account = match tokens.next() {
        Some(account) => account,
        None => return Ok(None),
    };

    // `key: value` metadata
    if account.ends_with(':') {
        return Ok(None);
    }

    if !is_account_name(account) {
        return Err(TallyError::ledger(
            line_number,
            format!("invalid account name: {}", account),
        ));
    }

    let rest = tokens.collect::<Vec<_>>().join(" ");
    let amount = if rest.is_empty() {
        None
    } else {
        Some(parse_amount(&rest, line_number)?)
    };

    Ok(Some(PendingPosting {
        account: account.to_string(),
        amount,
        line: line_number,
    }))
}

/// `NUMBER CUR [{COST}] [@ PRICE | @@ TOTAL]`
fn parse_amount(text: &str, line_number: usize) -> TallyResult<PostedAmount> {
    let (head, price) = match text.find('@') {
        Some(at) => (&text[..at], Some(&text[at..])),
        None => (text, None),
    };
    let (written, cost) = match head.find('{') {
        Some(brace) => (&head[..brace], Some(head[brace..].trim())),
        None => (head, None),
    };

    let mut tokens = written.split_whitespace();
    let number = tokens.next().unwrap_or_default();
    let units = Quantity {
        number: parse_number(number, line_number)?,
        currency: tokens
            .next()
            .map(str::to_uppercase)
            .ok_or_else(|| TallyError::ledger(line_number, "amount is missing its currency"))?,
    };

    let weight = match (cost, price) {
        (Some(cost), _) => parse_cost(cost, &units, line_number)?,
        (None, Some(price)) => Some(parse_price(price, &units, line_number)?),
        (None, None) => Some(units.clone()),
    };

    Ok(PostedAmount { units, weight })
}

/// Weight of `{per-unit CUR}` or `{{total CUR}}`; `None` when no amount is given
fn parse_cost(text: &str, units: &Quantity, line_number: usize) -> TallyResult<Option<Quantity>> {
    let (inner, total) = if let Some(inner) = text.strip_prefix("{{") {
        (inner.strip_suffix("}}"), true)
    } else {
        (text.strip_prefix('{').and_then(|t| t.strip_suffix('}')), false)
    };
    let inner =
        inner.ok_or_else(|| TallyError::ledger(line_number, format!("malformed cost: {}", text)))?;

    // Dates and labels may sit next to the amount.
    let component = inner.split(',').map(str::trim).find(|component| {
        let mut parts = component.split_whitespace();
        matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(number), Some(_), None) if number.replace(',', "").parse::<Decimal>().is_ok()
        )
    });
    match component {
        Some(component) => Ok(Some(weigh(component, total, units, line_number)?)),
        None => Ok(None),
    }
}

fn parse_price(text: &str, units: &Quantity, line_number: usize) -> TallyResult<Quantity> {
    let (amount, total) = match text.strip_prefix("@@") {
        Some(amount) => (amount, true),
        None => (text.trim_start_matches('@'), false),
    };
    weigh(amount, total, units, line_number)
}

/// Weight of `units` at a per-unit or total amount
fn weigh(amount: &str, total: bool, units: &Quantity, line_number: usize) -> TallyResult<Quantity> {
    let mut tokens = amount.split_whitespace();
    let number = match tokens.next() {
        Some(number) => parse_number(number, line_number)?,
        None => return Err(TallyError::ledger(line_number, "price is missing its amount")),
    };
    let currency = tokens
        .next()
        .map(str::to_uppercase)
        .ok_or_else(|| TallyError::ledger(line_number, "price is missing its currency"))?;

    let number = if total {
        if units.number.is_sign_negative() {
            -number.abs()
        } else {
            number.abs()
        }
    } else {
        units
            .number
            .checked_mul(number)
            .ok_or_else(|| TallyError::ledger(line_number, "amount out of range"))?
    };

    Ok(Quantity { number, currency })
}

fn parse_number(text: &str, line_number: usize) -> TallyResult<Decimal> {
    text.replace(',', "")
        .parse::<Decimal>()
        .map_err(|_| TallyError::ledger(line_number, format!("Invalid amount: {}", text)))
}

fn is_account_name(name: &str) -> bool {
    let root = name.split(':').next().unwrap_or_default();
    root.chars().next().is_some_and(|c| c.is_ascii_uppercase())
        && name.contains(':')
        && name.split(':').all(|component| !component.is_empty())
}
