//! Embedded frontend: search form, result table, Leaflet map.

pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="fr">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Perimetre</title>
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
  <link rel="stylesheet" href="/style.css">
</head>
<body>
  <h1>Perimetre</h1>
  <p class="subtitle">Communes autour d'un point de reference</p>

  <form id="search-form">
    <label for="query">Nom de la commune ou code postal</label>
    <input type="text" id="query" value="Aubervilliers" autocomplete="off">

    <label for="radius">Rayon de recherche (km) : <span id="radius-value">10</span></label>
    <input type="range" id="radius" min="1" max="50" value="10">

    <label for="key" id="key-label" hidden>Cle d'acces</label>
    <input type="password" id="key" hidden autocomplete="off">

    <button type="submit">Rechercher</button>
  </form>

  <p id="status"></p>

  <div id="results" hidden>
    <h2 id="results-title"></h2>
    <table id="results-table">
      <thead>
        <tr><th>Nom</th><th>Code postal</th><th>Distance (km)</th></tr>
      </thead>
      <tbody></tbody>
    </table>
    <a id="export-link" href="#">Telecharger les resultats en CSV</a>
    <div id="map"></div>
  </div>

  <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
  <script src="/app.js"></script>
</body>
</html>
"##;

pub const STYLE_CSS: &str = r##"body {
  font-family: system-ui, sans-serif;
  max-width: 860px;
  margin: 2rem auto;
  padding: 0 1rem;
  color: #222;
}

h1 {
  color: #c82832;
  margin-bottom: 0.2rem;
}

.subtitle {
  color: #666;
  margin-top: 0;
}

form {
  display: grid;
  gap: 0.5rem;
  max-width: 420px;
  margin-bottom: 1rem;
}

input[type="text"], input[type="password"] {
  padding: 0.45rem;
  border: 1px solid #bbb;
  border-radius: 4px;
}

button {
  padding: 0.5rem;
  background: #c82832;
  color: #fff;
  border: none;
  border-radius: 4px;
  cursor: pointer;
}

button:hover {
  background: #a81f28;
}

#status {
  color: #a05a00;
  min-height: 1.2em;
}

table {
  border-collapse: collapse;
  width: 100%;
  margin-bottom: 0.8rem;
}

th, td {
  text-align: left;
  padding: 0.35rem 0.6rem;
  border-bottom: 1px solid #ddd;
}

th {
  background: #f6f6f6;
}

td:last-child, th:last-child {
  text-align: right;
}

#export-link {
  display: inline-block;
  margin-bottom: 0.8rem;
  color: #c82832;
}

#map {
  height: 420px;
  border: 1px solid #ccc;
  border-radius: 4px;
}
"##;

pub const APP_JS: &str = r##"let map = null;
let markers = [];

const form = document.getElementById('search-form');
const statusLine = document.getElementById('status');
const results = document.getElementById('results');
const radiusInput = document.getElementById('radius');

radiusInput.addEventListener('input', () => {
  document.getElementById('radius-value').textContent = radiusInput.value;
});

form.addEventListener('submit', (e) => {
  e.preventDefault();
  runSearch();
});

function searchParams() {
  const params = new URLSearchParams({
    query: document.getElementById('query').value.trim(),
    radius: radiusInput.value,
  });
  const key = document.getElementById('key').value.trim();
  if (key) params.set('key', key);
  return params;
}

async function runSearch() {
  statusLine.textContent = '';
  const params = searchParams();
  if (!params.get('query')) {
    statusLine.textContent = 'Entrez un nom de commune ou un code postal.';
    return;
  }

  const res = await fetch('/api/search?' + params.toString());
  if (res.status === 401) {
    document.getElementById('key').hidden = false;
    document.getElementById('key-label').hidden = false;
    statusLine.textContent = "Cle d'acces requise ou invalide.";
    results.hidden = true;
    return;
  }
  if (res.status === 404) {
    statusLine.textContent = 'Commune non trouvee. Verifiez le nom ou le code postal.';
    results.hidden = true;
    return;
  }
  if (!res.ok) {
    statusLine.textContent = 'La recherche a echoue (' + res.status + ').';
    results.hidden = true;
    return;
  }

  const data = await res.json();
  renderResults(data, params);
}

function renderResults(data, params) {
  results.hidden = false;
  document.getElementById('results-title').textContent =
    'Communes dans un rayon de ' + data.radius_km + ' km autour de ' +
    data.reference.name + ' (' + data.reference.postal_code + ') : ' + data.count;

  const tbody = document.querySelector('#results-table tbody');
  tbody.innerHTML = '';
  for (const hit of data.hits) {
    const row = document.createElement('tr');
    for (const value of [hit.name, hit.postal_code, hit.distance_km.toFixed(2)]) {
      const cell = document.createElement('td');
      cell.textContent = value;
      row.appendChild(cell);
    }
    tbody.appendChild(row);
  }

  document.getElementById('export-link').href = '/api/export?' + params.toString();
  renderMap(data);
}

function renderMap(data) {
  if (!map) {
    map = L.map('map');
    L.tileLayer('https://tile.openstreetmap.org/{z}/{x}/{y}.png', {
      attribution: '&copy; OpenStreetMap contributors',
    }).addTo(map);
  }
  map.setView([data.reference.lat, data.reference.lon], 10);

  for (const m of markers) m.remove();
  markers = [];

  const ref = L.circleMarker([data.reference.lat, data.reference.lon], {
    radius: 8, color: '#c82832', fillOpacity: 0.9,
  }).addTo(map);
  ref.bindTooltip(data.reference.name + ' (' + data.reference.postal_code + ')');
  markers.push(ref);

  for (const hit of data.hits) {
    const marker = L.circleMarker([hit.lat, hit.lon], {
      radius: 6, color: '#0064c8', fillOpacity: 0.6,
    }).addTo(map);
    marker.bindTooltip(hit.name + ' (' + hit.postal_code + ')');
    markers.push(marker);
  }
}

runSearch();
"##;
