//! Market panels: live quotes and price history.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph,
        Row, Table,
    },
};

use crate::state::{
    BRECHA_KEY, DOLAR_BLUE_KEY, DOLAR_OFICIAL_KEY, MarketState, PriceHistory, QuoteStatus,
};

/// Shown when quotes could not be fetched.
pub const MARKET_UNAVAILABLE_MESSAGE: &str = "Datos de mercado no disponibles";
/// Shown when the history request failed or returned nothing.
pub const EMPTY_HISTORY_MESSAGE: &str = "No hay datos históricos disponibles";
/// Shown when neither the commodity price nor the exchange gap is available.
pub const EMPTY_CORRELATION_MESSAGE: &str = "No hay datos de dólar disponibles";

const GAP_COLOR: Color = Color::Rgb(245, 158, 11);

const SERIES_COLORS: [Color; 5] = [
    Color::Yellow,
    Color::Green,
    Color::Cyan,
    Color::Magenta,
    Color::Blue,
];

fn message(frame: &mut Frame, area: Rect, block: Block, text: &str) {
    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(paragraph, area);
}

/// Live quotes table.
pub struct QuoteTable;

impl QuoteTable {
    pub fn render(frame: &mut Frame, area: Rect, market: &MarketState) {
        let updated = market
            .last_updated
            .map(|t| format!(" · {}", t.with_timezone(&chrono::Local).format("%H:%M:%S")))
            .unwrap_or_default();
        let block = Block::default()
            .title(format!(" Cotizaciones{updated} "))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let Some(snapshot) = &market.snapshot else {
            let text = if market.loading {
                "Cargando cotizaciones..."
            } else {
                MARKET_UNAVAILABLE_MESSAGE
            };
            message(frame, area, block, text);
            return;
        };

        let header = Row::new(["Activo", "Precio", "Variación", "Símbolo"].map(|h| {
            Cell::from(h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        }))
        .bottom_margin(1);

        let rows = snapshot.quotes.iter().map(|quote| {
            let (price, change) = match &quote.status {
                QuoteStatus::Available {
                    price,
                    currency,
                    change_percent,
                } => {
                    let color = if change_percent.is_sign_negative() {
                        Color::Red
                    } else if change_percent.is_zero() {
                        Color::Gray
                    } else {
                        Color::Green
                    };
                    (
                        Cell::from(format!("{price:.2} {currency}")),
                        Cell::from(format!("{change_percent:+.2}%"))
                            .style(Style::default().fg(color)),
                    )
                }
                QuoteStatus::Unavailable(_) => (
                    Cell::from("no disponible").style(Style::default().fg(Color::DarkGray)),
                    Cell::from("-"),
                ),
            };

            Row::new(vec![
                Cell::from(quote.label()),
                price,
                change,
                Cell::from(quote.symbol.as_str()).style(Style::default().fg(Color::DarkGray)),
            ])
        });

        let table = Table::new(
            rows,
            [
                Constraint::Min(14),
                Constraint::Length(18),
                Constraint::Length(10),
                Constraint::Length(10),
            ],
        )
        .header(header)
        .block(block);

        frame.render_widget(table, area);
    }
}

/// Price history line chart.
pub struct PriceHistoryChart;

impl PriceHistoryChart {
    pub fn render(frame: &mut Frame, area: Rect, market: &MarketState) {
        let block = Block::default()
            .title(format!(
                " Historial de precios · {} días (p cambia) ",
                market.history_days
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        if market.history_loading && market.history.is_none() {
            message(frame, area, block, "Cargando historial...");
            return;
        }

        let Some(history) = market.history.as_ref().filter(|h| !h.is_empty()) else {
            message(frame, area, block, EMPTY_HISTORY_MESSAGE);
            return;
        };
        let Some((lo, hi)) = history.value_bounds() else {
            message(frame, area, block, EMPTY_HISTORY_MESSAGE);
            return;
        };

        let keys = history.series_keys();
        let series: Vec<Vec<(f64, f64)>> = keys.iter().map(|k| history.series(k)).collect();

        let datasets = keys
            .iter()
            .zip(&series)
            .enumerate()
            .map(|(i, (key, points))| {
                Dataset::default()
                    .name(series_name(history, key))
                    .marker(Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(SERIES_COLORS[i % SERIES_COLORS.len()]))
                    .data(points)
            })
            .collect();

        let pad = ((hi - lo) * 0.05).max(1.0);
        let last_x = history.points.len().saturating_sub(1).max(1) as f64;
        let first_date = history.points.first().map(|p| p.date.format("%d/%m").to_string());
        let last_date = history.points.last().map(|p| p.date.format("%d/%m").to_string());

        let chart = Chart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .style(Style::default().fg(Color::Gray))
                    .bounds([0.0, last_x])
                    .labels([
                        Span::raw(first_date.unwrap_or_default()),
                        Span::raw(last_date.unwrap_or_default()),
                    ]),
            )
            .y_axis(
                Axis::default()
                    .style(Style::default().fg(Color::Gray))
                    .bounds([lo - pad, hi + pad])
                    .labels([
                        Span::raw(format!("{:.0}", lo - pad)),
                        Span::raw(format!("{:.0}", hi + pad)),
                    ]),
            );

        frame.render_widget(chart, area);
    }
}

/// Commodity price against the exchange gap, each on its own scale.
pub struct DollarCorrelationChart;

impl DollarCorrelationChart {
    pub fn render(frame: &mut Frame, area: Rect, market: &MarketState) {
        let block = Block::default()
            .title(" Correlación Dólar / Soja ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        // The panel requests a single commodity, so its only price series.
        let history = market.correlation.as_ref();
        let price_key = history.and_then(|h| h.series_keys().first().map(|k| k.to_string()));
        let Some(history) = history
            .filter(|h| price_key.is_some() || h.latest(BRECHA_KEY).is_some())
        else {
            message(frame, area, block, EMPTY_CORRELATION_MESSAGE);
            return;
        };

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Percentage(60),
                Constraint::Min(3),
            ])
            .split(inner);

        frame.render_widget(Paragraph::new(rates_line(history)), chunks[0]);
        if let Some(key) = &price_key {
            render_price_line(frame, chunks[1], history, key);
        }
        render_gap_bars(frame, chunks[2], history);
    }
}

fn rates_line(history: &PriceHistory) -> Line<'static> {
    let rate = |key: &str| {
        history
            .latest(key)
            .map_or_else(|| "-".to_string(), |v| format!("${v:.0}"))
    };
    let gap = history
        .latest(BRECHA_KEY)
        .map_or_else(|| "-".to_string(), |v| format!("{v:.1}%"));

    Line::from(vec![
        Span::styled("Oficial ", Style::default().fg(Color::Gray)),
        Span::raw(rate(DOLAR_OFICIAL_KEY)),
        Span::styled("  Blue ", Style::default().fg(Color::Gray)),
        Span::raw(rate(DOLAR_BLUE_KEY)),
        Span::styled("  Brecha ", Style::default().fg(Color::Gray)),
        Span::styled(gap, Style::default().fg(GAP_COLOR)),
    ])
}

fn render_price_line(frame: &mut Frame, area: Rect, history: &PriceHistory, key: &str) {
    let points = history.series(key);
    let Some((lo, hi)) = history.series_bounds(key) else {
        return;
    };
    let pad = ((hi - lo) * 0.05).max(1.0);
    let last_x = history.points.len().saturating_sub(1).max(1) as f64;

    let datasets = vec![
        Dataset::default()
            .name(format!("{} (USD/ton)", series_name(history, key)))
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green))
            .data(&points),
    ];
    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, last_x]),
        )
        .y_axis(
            Axis::default()
                .title("USD/ton")
                .style(Style::default().fg(Color::Green))
                .bounds([lo - pad, hi + pad])
                .labels([
                    Span::raw(format!("{:.0}", lo - pad)),
                    Span::raw(format!("{:.0}", hi + pad)),
                ]),
        );
    frame.render_widget(chart, area);
}

fn render_gap_bars(frame: &mut Frame, area: Rect, history: &PriceHistory) {
    let bars: Vec<Bar> = history
        .points
        .iter()
        .filter_map(|p| {
            let pct = *p.values.get(BRECHA_KEY)?;
            Some(
                Bar::default()
                    .value((pct.max(0.0) * 10.0).round() as u64)
                    .text_value(format!("{pct:.1}%"))
                    .label(Line::from(p.date.format("%d/%m").to_string()))
                    .style(Style::default().fg(GAP_COLOR)),
            )
        })
        .collect();

    if bars.is_empty() {
        let empty = Paragraph::new("Brecha cambiaria sin datos")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(empty, area);
        return;
    }

    let chart = BarChart::default()
        .block(Block::default().title("Brecha %"))
        .bar_width(7)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, area);
}

/// Display name for a series key such as `soja_usd`.
fn series_name(history: &PriceHistory, key: &str) -> String {
    history
        .commodities
        .iter()
        .find(|c| key == c.key || key.starts_with(&format!("{}_", c.key)))
        .map(|c| c.name.clone())
        .unwrap_or_else(|| key.to_string())
}
