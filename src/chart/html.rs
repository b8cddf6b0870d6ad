// =============================================================================
// Interactive HTML price chart
// =============================================================================
//
// A self-contained page: the series is embedded as JSON and drawn on a
// <canvas> by a small inline script with a hover crosshair that shows the
// date, close, and moving average under the cursor.

use chrono::NaiveDate;
use serde_json::json;

use super::svg::escape;

const TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>__TITLE__</title>
<style>
  body { font-family: sans-serif; margin: 24px; }
  #wrap { position: relative; width: 1000px; }
  #tip { position: absolute; pointer-events: none; background: rgba(255,255,255,0.92);
         border: 1px solid #999; padding: 4px 8px; font-size: 12px; display: none; }
</style>
</head>
<body>
<h2>__TITLE__</h2>
<div id="wrap"><canvas id="chart" width="1000" height="600"></canvas><div id="tip"></div></div>
<script>
const DATA = __DATA__;
const cv = document.getElementById("chart"), ctx = cv.getContext("2d"), tip = document.getElementById("tip");
const L = 70, R = 20, T = 20, B = 50, W = cv.width - L - R, H = cv.height - T - B;
const vals = DATA.close.concat(DATA.ma.filter(v => v !== null));
let lo = Math.min(...vals), hi = Math.max(...vals);
if (hi - lo < 1e-9) { lo -= 1; hi += 1; }
const pad = (hi - lo) * 0.05; lo -= pad; hi += pad;
const n = DATA.dates.length;
const x = i => L + (n > 1 ? W * i / (n - 1) : W / 2);
const y = v => T + H * (hi - v) / (hi - lo);
function line(values, color) {
  ctx.strokeStyle = color; ctx.lineWidth = 1.8; ctx.beginPath();
  let down = false;
  values.forEach((v, i) => {
    if (v === null) { down = false; return; }
    if (down) ctx.lineTo(x(i), y(v)); else ctx.moveTo(x(i), y(v));
    down = true;
  });
  ctx.stroke();
}
function draw(hover) {
  ctx.clearRect(0, 0, cv.width, cv.height);
  ctx.strokeStyle = "#444"; ctx.strokeRect(L, T, W, H);
  ctx.fillStyle = "#000"; ctx.font = "12px sans-serif";
  for (let k = 0; k <= 5; k++) {
    const v = lo + (hi - lo) * k / 5;
    ctx.fillText(v.toFixed(2), 8, y(v) + 4);
  }
  const step = Math.max(1, Math.floor((n - 1) / 5));
  for (let i = 0; i < n; i += step) ctx.fillText(DATA.dates[i], x(i) - 30, T + H + 20);
  line(DATA.close, "#1f77b4");
  line(DATA.ma, "#ff7f0e");
  ctx.fillStyle = "#1f77b4"; ctx.fillText("Close Price", L + W - 150, T + 16);
  ctx.fillStyle = "#ff7f0e"; ctx.fillText(DATA.ma_label, L + W - 150, T + 32);
  if (hover !== null) {
    ctx.strokeStyle = "#bbb"; ctx.beginPath();
    ctx.moveTo(x(hover), T); ctx.lineTo(x(hover), T + H); ctx.stroke();
  }
}
cv.addEventListener("mousemove", e => {
  const r = cv.getBoundingClientRect();
  const i = Math.round((e.clientX - r.left - L) / (n > 1 ? W / (n - 1) : 1));
  if (i < 0 || i >= n) { tip.style.display = "none"; draw(null); return; }
  draw(i);
  const ma = DATA.ma[i] === null ? "n/a" : DATA.ma[i].toFixed(2);
  tip.innerHTML = DATA.dates[i] + "<br>Close: " + DATA.close[i].toFixed(2) + "<br>" + DATA.ma_label + ": " + ma;
  tip.style.left = (x(i) + 12) + "px"; tip.style.top = (e.clientY - r.top) + "px";
  tip.style.display = "block";
});
cv.addEventListener("mouseleave", () => { tip.style.display = "none"; draw(null); });
draw(null);
</script>
</body>
</html>
"##;

/// Render the interactive close + moving-average page.
pub fn render_price_page(
    title: &str,
    dates: &[NaiveDate],
    closes: &[f64],
    ma_label: &str,
    moving_average: &[Option<f64>],
) -> String {
    let data = json!({
        "dates": dates.iter().map(|d| d.to_string()).collect::<Vec<_>>(),
        "close": closes,
        "ma": moving_average,
        "ma_label": ma_label,
    });
    // Keep a stray "</script>" inside a string from closing the element.
    let data = data.to_string().replace("</", "<\\/");

    TEMPLATE
        .replace("__TITLE__", &escape(title))
        .replace("__DATA__", &data)
}
