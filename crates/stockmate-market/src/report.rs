//! Chat report formatting

use crate::api::NewsItem;
use crate::config::MarketConfig;
use crate::error::MarketError;
use crate::fx::{RateQuote, pair_base};
use crate::investment::{InvestmentAnalysis, Outcome};
use crate::quote::{ConversionRate, Direction, QuoteResult, RateSource};

const DIVIDER: &str = "--------------------------";

/// Appended when a report is cut to fit the response cap
pub const TRUNCATION_MARKER: &str = "\n...(이하 생략)";

/// What a report was about, used to phrase failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject<'a> {
    Quote(&'a str),
    ExchangeRate { base: &'a str, quote: &'a str },
    News(&'a str),
    Investment,
    Briefing,
}

impl Subject<'_> {
    fn action(&self) -> &'static str {
        match self {
            Self::Quote(_) => "시황 조회",
            Self::ExchangeRate { .. } => "환율 조회",
            Self::News(_) => "뉴스 조회",
            Self::Investment => "수익률 분석",
            Self::Briefing => "환율 브리핑",
        }
    }
}

/// One currency in a briefing; `rate` is `None` when the pair could not be fetched
#[derive(Debug, Clone, PartialEq)]
pub struct BriefingLine {
    pub currency: String,
    pub rate: Option<RateQuote>,
}

pub trait ReportFormatter: Send + Sync {
    /// `native_currency` labels the unconverted price of a foreign quote
    fn format_quote(
        &self,
        quote: &QuoteResult,
        display_name: &str,
        native_currency: Option<&str>,
    ) -> String;
    fn format_exchange_rate(&self, rate: &RateQuote) -> String;
    fn format_news(&self, symbol: &str, items: &[NewsItem]) -> String;
    fn format_investment(&self, analysis: &InvestmentAnalysis) -> String;
    fn format_briefing(&self, lines: &[BriefingLine]) -> String;
    fn format_error(&self, subject: Subject<'_>, error: &MarketError) -> String;
}

/// Emoji-rich Korean layout for chat clients
#[derive(Debug, Clone)]
pub struct ChatFormatter {
    local_currency: String,
    foreign_currency: String,
}

impl ChatFormatter {
    pub fn new(config: &MarketConfig) -> Self {
        Self {
            local_currency: config.local_currency.clone(),
            foreign_currency: pair_base(&config.fx_pair).unwrap_or("USD").to_string(),
        }
    }

    fn local_money(&self, amount: f64) -> String {
        money(amount, &self.local_currency)
    }

    fn rate_line(&self, rate: &ConversionRate) -> String {
        let value = rate_text(rate.value, &self.local_currency);
        match rate.source {
            RateSource::Live => format!("{value} (실시간)"),
            RateSource::Fallback => format!("{value} (추정치, 실시간 환율 조회 실패)"),
            RateSource::Provided => format!("{value} (입력값)"),
        }
    }
}

impl ReportFormatter for ChatFormatter {
    fn format_quote(
        &self,
        quote: &QuoteResult,
        display_name: &str,
        native_currency: Option<&str>,
    ) -> String {
        let mut lines = vec!["[[ StockMate 실시간 시황 ]]".to_string(), String::new()];

        if display_name == quote.symbol {
            lines.push(format!("📌 종목: {}", quote.symbol));
        } else {
            lines.push(format!("📌 종목: {display_name} ({})", quote.symbol));
        }

        match quote.conversion {
            Some(rate) => {
                let approx = if rate.is_fallback() { "약 " } else { "" };
                let native = native_currency
                    .map(str::trim)
                    .filter(|code| !code.is_empty())
                    .unwrap_or(&self.foreign_currency);
                lines.push(format!(
                    "💰 현재가: {approx}{} ({})",
                    self.local_money(quote.display_price),
                    money(quote.latest_price, native)
                ));
                lines.push(format!("📈 등락률: {}", change_text(quote.direction, quote.percent_change)));
                lines.push(format!("💱 적용 환율: {}", self.rate_line(&rate)));
            }
            None => {
                lines.push(format!("💰 현재가: {}", self.local_money(quote.display_price)));
                lines.push(format!("📈 등락률: {}", change_text(quote.direction, quote.percent_change)));
            }
        }

        lines.push(DIVIDER.to_string());
        lines.push("💡 매수가와 수량을 알려주시면 수익률도 계산해드려요!".to_string());
        lines.join("\n")
    }

    fn format_exchange_rate(&self, rate: &RateQuote) -> String {
        let mut lines = vec![
            "[[ 💱 실시간 환율 정보 ]]".to_string(),
            String::new(),
            format!("💵 1 {} = {}", rate.base, rate_text(rate.rate, &rate.quote)),
        ];

        if let Some(change) = rate.change {
            lines.push(format!("📈 전일 대비: {}", change_text(change.direction, change.percent_change)));
        }

        lines.push(DIVIDER.to_string());
        lines.push("(Yahoo Finance 데이터 기준)".to_string());
        lines.join("\n")
    }

    fn format_news(&self, symbol: &str, items: &[NewsItem]) -> String {
        if items.is_empty() {
            return format!("📰 '{symbol}' 관련 최신 뉴스가 없습니다.");
        }

        let mut lines = vec![format!("[[ 📰 {symbol} 최신 주요 뉴스 ]]")];

        for (i, item) in items.iter().enumerate() {
            lines.push(String::new());
            lines.push(format!("{}. {}", i + 1, item.title));

            let source: Vec<String> = item
                .publisher
                .iter()
                .cloned()
                .chain(item.published_at.map(|at| at.format("%Y-%m-%d").to_string()))
                .collect();
            if !source.is_empty() {
                lines.push(format!("   🗞️ {}", source.join(" · ")));
            }

            if !item.link.is_empty() {
                lines.push(format!("   🔗 {}", item.link));
            }
        }

        lines.join("\n")
    }

    fn format_investment(&self, analysis: &InvestmentAnalysis) -> String {
        let outcome = match analysis.outcome {
            Outcome::Profit => "🔥 수익 중",
            Outcome::Loss => "🧊 손실 중",
            Outcome::BreakEven => "⚖️ 본전",
        };
        let currency = analysis.currency.as_str();

        let mut lines = vec![
            "[[ 📊 투자 수익률 분석 보고서 ]]".to_string(),
            String::new(),
            format!("✅ 분석 결과: {outcome}"),
            DIVIDER.to_string(),
            format!("🔹 매수단가: {}", money(analysis.buy_price, currency)),
            format!("🔹 현재가: {}", money(analysis.current_price, currency)),
            format!("🔸 보유수량: {}주", format_number(analysis.quantity as f64, 0)),
            String::new(),
            format!("💰 평가손익: {}", signed_money(analysis.profit, currency)),
            format!(
                "📈 수익률: {}",
                change_text(Direction::from_change(analysis.roi_percent), analysis.roi_percent)
            ),
        ];

        if let (Some(rate), Some(local_profit)) = (analysis.conversion, analysis.local_profit) {
            let label = local_label(&self.local_currency);
            lines.push(format!(
                "💱 {label} 환산 손익: {} (적용 환율 {})",
                signed_money(local_profit, &self.local_currency),
                self.rate_line(&rate)
            ));
            if let Some(local_value) = analysis.local_value {
                lines.push(format!("💵 {label} 평가금액: {}", self.local_money(local_value)));
            }
        }

        lines.push(DIVIDER.to_string());
        lines.join("\n")
    }

    fn format_briefing(&self, lines: &[BriefingLine]) -> String {
        let mut out = vec!["[[ 🌏 주요 환율 브리핑 ]]".to_string(), String::new()];

        for line in lines {
            let flag = flag(&line.currency);
            match &line.rate {
                Some(rate) => {
                    let mut text = format!("{flag} {}: {}", line.currency, rate_text(rate.rate, &rate.quote));
                    if let Some(change) = rate.change {
                        text.push_str(&format!(" ({})", change_text(change.direction, change.percent_change)));
                    }
                    out.push(text);
                }
                None => out.push(format!("{flag} {}: 조회 불가", line.currency)),
            }
        }

        out.push(DIVIDER.to_string());
        out.push(format!("기준 통화: {}", self.local_currency));
        out.join("\n")
    }

    fn format_error(&self, subject: Subject<'_>, error: &MarketError) -> String {
        match (error, subject) {
            (MarketError::DataInsufficiency { .. }, Subject::Quote(symbol)) => format!(
                "❌ '{symbol}' 종목을 찾을 수 없습니다. 종목 코드를 확인해주세요.\n\
                 (국내 종목은 005930.KS 처럼 .KS / .KQ를 붙여주세요)"
            ),
            (MarketError::DataInsufficiency { .. }, Subject::ExchangeRate { base, quote }) => {
                format!("❌ {base}/{quote} 환율 정보를 가져올 수 없습니다.")
            }
            (MarketError::DataInsufficiency { symbol, .. }, _) => {
                format!("❌ '{symbol}' 데이터를 찾을 수 없습니다.")
            }
            (MarketError::InvalidArithmeticInput(reason), _) => {
                format!("⚠️ 계산할 수 없는 입력입니다: {reason}")
            }
            (MarketError::InvalidInput(reason), _) => format!("⚠️ 입력값을 확인해주세요: {reason}"),
            (other, subject) => format!("⚠️ {} 중 오류 발생: {other}", subject.action()),
        }
    }
}

/// Cut `text` to at most `max_bytes` on a char boundary, marking the cut
pub fn fit_response(mut text: String, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text;
    }

    let mut cut = max_bytes.saturating_sub(TRUNCATION_MARKER.len());
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }

    text.truncate(cut);
    text.push_str(TRUNCATION_MARKER);
    text
}

/// Format a number with comma thousands separators
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let digits = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits.as_str(), None),
    };

    let mut grouped = String::with_capacity(digits.len() + int_part.len() / 3 + 1);
    // "-0.00" reads as noise
    if value < 0.0 && digits.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        grouped.push('-');
    }
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if let Some(frac_part) = frac_part {
        grouped.push('.');
        grouped.push_str(frac_part);
    }

    grouped
}

/// Amount in a currency: whole 원 for KRW, two decimals otherwise
pub fn money(amount: f64, currency: &str) -> String {
    if currency == "KRW" {
        format!("{}원", format_number(amount, 0))
    } else {
        format!("{} {currency}", format_number(amount, 2))
    }
}

fn signed_money(amount: f64, currency: &str) -> String {
    let text = money(amount, currency);
    if amount > 0.0 { format!("+{text}") } else { text }
}

fn rate_text(value: f64, currency: &str) -> String {
    let decimals = if value.abs() < 1.0 { 4 } else { 2 };
    let number = format_number(value, decimals);
    if currency == "KRW" {
        format!("{number}원")
    } else {
        format!("{number} {currency}")
    }
}

fn change_text(direction: Direction, percent: f64) -> String {
    match direction {
        Direction::Up => format!("🔺 +{percent:.2}%"),
        Direction::Down => format!("🔻 {percent:.2}%"),
        Direction::Flat => "➖ 0.00% (보합)".to_string(),
    }
}

fn local_label(currency: &str) -> &str {
    if currency == "KRW" { "원화" } else { currency }
}

fn flag(currency: &str) -> &'static str {
    match currency {
        "USD" => "🇺🇸",
        "EUR" => "🇪🇺",
        "JPY" => "🇯🇵",
        "CNY" => "🇨🇳",
        "GBP" => "🇬🇧",
        "AUD" => "🇦🇺",
        "CAD" => "🇨🇦",
        "CHF" => "🇨🇭",
        "HKD" => "🇭🇰",
        "KRW" => "🇰🇷",
        _ => "💱",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::PriceChange;
    use chrono::{TimeZone, Utc};

    fn formatter() -> ChatFormatter {
        ChatFormatter::new(&MarketConfig::default())
    }

    fn live(value: f64) -> ConversionRate {
        ConversionRate {
            value,
            source: RateSource::Live,
        }
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(1000.0, 0), "1,000");
        assert_eq!(format_number(206_550.0, 0), "206,550");
        assert_eq!(format_number(1_234_567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-120_000.0, 0), "-120,000");
        assert_eq!(format_number(-0.001, 2), "0.00");
        assert_eq!(format_number(0.000_74, 4), "0.0007");
    }

    #[test]
    fn test_fit_response() {
        assert_eq!(fit_response("short".to_string(), 100), "short");

        let text = "가".repeat(50);
        let cut = fit_response(text, 40);
        assert!(cut.len() <= 40);
        assert!(cut.ends_with(TRUNCATION_MARKER));
        assert!(cut.starts_with('가'));
    }

    #[test]
    fn test_domestic_quote() {
        let quote = QuoteResult {
            symbol: "005930.KS".to_string(),
            latest_price: 68000.0,
            prior_price: 70000.0,
            percent_change: (68000.0 - 70000.0) / 70000.0 * 100.0,
            direction: Direction::Down,
            is_foreign: false,
            conversion: None,
            display_price: 68000.0,
        };

        let text = formatter().format_quote(&quote, "Samsung Electronics", Some("KRW"));
        assert!(text.contains("📌 종목: Samsung Electronics (005930.KS)"));
        assert!(text.contains("💰 현재가: 68,000원"));
        assert!(text.contains("🔻 -2.86%"));
        assert!(!text.contains("환율"));
    }

    #[test]
    fn test_foreign_quote() {
        let quote = QuoteResult {
            symbol: "AAPL".to_string(),
            latest_price: 153.0,
            prior_price: 150.0,
            percent_change: 2.0,
            direction: Direction::Up,
            is_foreign: true,
            conversion: Some(live(1350.0)),
            display_price: 206_550.0,
        };

        let text = formatter().format_quote(&quote, "AAPL", None);
        assert!(text.contains("📌 종목: AAPL\n"));
        assert!(text.contains("💰 현재가: 206,550원 (153.00 USD)"));
        assert!(text.contains("🔺 +2.00%"));
        assert!(text.contains("💱 적용 환율: 1,350.00원 (실시간)"));
    }

    #[test]
    fn test_foreign_quote_uses_native_currency() {
        let quote = QuoteResult {
            symbol: "7203.T".to_string(),
            latest_price: 2550.0,
            prior_price: 2500.0,
            percent_change: 2.0,
            direction: Direction::Up,
            is_foreign: true,
            conversion: Some(live(1350.0)),
            display_price: 2550.0 * 1350.0,
        };

        let text = formatter().format_quote(&quote, "Toyota Motor Corporation", Some("JPY"));
        assert!(text.contains("💰 현재가: 3,442,500원 (2,550.00 JPY)"));
        assert!(!text.contains("USD"));

        let blank = formatter().format_quote(&quote, "7203.T", Some("  "));
        assert!(blank.contains("(2,550.00 USD)"));
    }

    #[test]
    fn test_fallback_rate_marked_approximate() {
        let quote = QuoteResult {
            symbol: "AAPL".to_string(),
            latest_price: 100.0,
            prior_price: 100.0,
            percent_change: 0.0,
            direction: Direction::Flat,
            is_foreign: true,
            conversion: Some(ConversionRate {
                value: 1350.0,
                source: RateSource::Fallback,
            }),
            display_price: 135_000.0,
        };

        let text = formatter().format_quote(&quote, "AAPL", None);
        assert!(text.contains("약 135,000원"));
        assert!(text.contains("추정치"));
        assert!(text.contains("➖ 0.00% (보합)"));
    }

    #[test]
    fn test_exchange_rate() {
        let rate = RateQuote {
            base: "USD".to_string(),
            quote: "KRW".to_string(),
            rate: 1351.2,
            change: Some(PriceChange {
                latest: 1351.2,
                prior: 1346.5,
                percent_change: 0.35,
                direction: Direction::Up,
            }),
        };

        let text = formatter().format_exchange_rate(&rate);
        assert!(text.contains("💵 1 USD = 1,351.20원"));
        assert!(text.contains("전일 대비: 🔺 +0.35%"));

        let no_change = RateQuote { change: None, ..rate };
        assert!(!formatter().format_exchange_rate(&no_change).contains("전일 대비"));
    }

    #[test]
    fn test_news() {
        let items = vec![
            NewsItem {
                title: "Apple unveils new chip".to_string(),
                link: "https://example.com/a".to_string(),
                publisher: Some("Reuters".to_string()),
                published_at: Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).single(),
            },
            NewsItem {
                title: "Second".to_string(),
                link: String::new(),
                publisher: None,
                published_at: None,
            },
        ];

        let text = formatter().format_news("AAPL", &items);
        assert!(text.starts_with("[[ 📰 AAPL 최신 주요 뉴스 ]]"));
        assert!(text.contains("1. Apple unveils new chip"));
        assert!(text.contains("Reuters · 2024-03-05"));
        assert!(text.contains("🔗 https://example.com/a"));
        assert!(text.contains("2. Second"));

        assert_eq!(
            formatter().format_news("AAPL", &[]),
            "📰 'AAPL' 관련 최신 뉴스가 없습니다."
        );
    }

    #[test]
    fn test_investment_domestic() {
        let analysis = InvestmentAnalysis {
            buy_price: 60000.0,
            current_price: 72000.0,
            quantity: 10,
            currency: "KRW".to_string(),
            profit: 120_000.0,
            roi_percent: 20.0,
            outcome: Outcome::Profit,
            conversion: None,
            local_profit: None,
            local_value: None,
        };

        let text = formatter().format_investment(&analysis);
        assert!(text.contains("🔥 수익 중"));
        assert!(text.contains("💰 평가손익: +120,000원"));
        assert!(text.contains("📈 수익률: 🔺 +20.00%"));
        assert!(text.contains("🔸 보유수량: 10주"));
        assert!(!text.contains("환산"));
    }

    #[test]
    fn test_investment_foreign_loss() {
        let analysis = InvestmentAnalysis {
            buy_price: 150.0,
            current_price: 140.0,
            quantity: 2,
            currency: "USD".to_string(),
            profit: -20.0,
            roi_percent: -6.666_666,
            outcome: Outcome::Loss,
            conversion: Some(live(1350.0)),
            local_profit: Some(-27_000.0),
            local_value: Some(378_000.0),
        };

        let text = formatter().format_investment(&analysis);
        assert!(text.contains("🧊 손실 중"));
        assert!(text.contains("💰 평가손익: -20.00 USD"));
        assert!(text.contains("원화 환산 손익: -27,000원"));
        assert!(text.contains("💵 원화 평가금액: 378,000원"));
        assert!(text.contains("🔻 -6.67%"));
    }

    #[test]
    fn test_briefing() {
        let lines = vec![
            BriefingLine {
                currency: "USD".to_string(),
                rate: Some(RateQuote {
                    base: "USD".to_string(),
                    quote: "KRW".to_string(),
                    rate: 1351.2,
                    change: None,
                }),
            },
            BriefingLine {
                currency: "EUR".to_string(),
                rate: None,
            },
        ];

        let text = formatter().format_briefing(&lines);
        assert!(text.contains("🇺🇸 USD: 1,351.20원"));
        assert!(text.contains("🇪🇺 EUR: 조회 불가"));
        assert!(text.ends_with("기준 통화: KRW"));
    }

    #[test]
    fn test_errors_by_kind() {
        let f = formatter();

        let not_found = MarketError::DataInsufficiency {
            symbol: "NOPE".to_string(),
            points: 0,
        };
        assert!(f
            .format_error(Subject::Quote("NOPE"), &not_found)
            .starts_with("❌ 'NOPE' 종목을 찾을 수 없습니다"));
        assert!(f
            .format_error(Subject::ExchangeRate { base: "XXX", quote: "KRW" }, &not_found)
            .contains("XXX/KRW"));

        let outage = MarketError::ProviderUnavailable("timeout".to_string());
        let text = f.format_error(Subject::News("AAPL"), &outage);
        assert!(text.starts_with("⚠️ 뉴스 조회 중 오류 발생"));
        assert!(text.contains("timeout"));

        let zero = MarketError::InvalidArithmeticInput("buy price is zero".to_string());
        assert!(f.format_error(Subject::Investment, &zero).contains("buy price is zero"));
    }
}
