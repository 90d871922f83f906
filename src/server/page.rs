use axum::response::Html;

pub async fn index() -> Html<&'static str> {
    Html(
        r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Image Description Generator</title>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }

        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: #f4f5fb;
            color: #222;
            padding: 32px 16px;
        }

        main {
            max-width: 960px;
            margin: 0 auto;
            background: white;
            border-radius: 12px;
            padding: 32px;
            box-shadow: 0 8px 30px rgba(0,0,0,0.08);
        }

        h1 { font-size: 1.8em; margin-bottom: 6px; }
        .subtitle { color: #666; margin-bottom: 24px; }

        form { display: grid; gap: 14px; margin-bottom: 24px; }
        label { font-weight: 600; font-size: 0.9em; }
        input[type="password"] { width: 100%; padding: 8px; border: 1px solid #ccc; border-radius: 6px; }
        .inline { display: flex; align-items: center; gap: 8px; font-weight: normal; }

        button {
            justify-self: start;
            background: #4455dd;
            color: white;
            border: none;
            border-radius: 6px;
            padding: 10px 22px;
            font-size: 1em;
            cursor: pointer;
        }
        button:disabled { background: #99a; cursor: wait; }

        .columns { display: grid; grid-template-columns: 1fr 1fr; gap: 24px; }
        .columns img { max-width: 100%; border-radius: 8px; }

        .box { border-radius: 8px; padding: 16px; margin-bottom: 12px; display: none; line-height: 1.5; }
        .success { background: #eef9ef; border: 1px solid #bfe3c2; }
        .info { background: #fff8e6; border: 1px solid #f0d98c; }
        .error { background: #fdeeee; border: 1px solid #f3bcbc; color: #a22; }
        .box h2 { font-size: 0.85em; text-transform: uppercase; letter-spacing: 1px; margin-bottom: 6px; color: #555; }
        .meta { font-size: 0.8em; color: #888; }
    </style>
</head>
<body>
<main>
    <h1>Image Description Generator</h1>
    <p class="subtitle">Upload an image to get an English description, optionally translated to Telugu.</p>

    <form id="form">
        <div>
            <label for="image">Choose an image (jpg, jpeg, png)</label><br>
            <input type="file" id="image" name="image" accept=".jpg,.jpeg,.png" required>
        </div>
        <div>
            <label for="token">API token (leave empty to use the server's token)</label>
            <input type="password" id="token" name="token" autocomplete="off">
        </div>
        <label class="inline"><input type="checkbox" id="translate" name="translate" checked> Translate to Telugu</label>
        <button type="submit" id="submit">Generate description</button>
    </form>

    <div class="columns">
        <div><img id="preview" alt=""></div>
        <div>
            <div class="box success" id="captionBox"><h2>Generated description</h2><p id="caption"></p></div>
            <div class="box success" id="translationBox"><h2>Telugu</h2><p id="translation"></p></div>
            <div class="box info" id="info"></div>
            <div class="box error" id="error"></div>
            <p class="meta" id="meta"></p>
        </div>
    </div>
</main>

<script>
    const $ = (id) => document.getElementById(id);
    const boxes = ['captionBox', 'translationBox', 'info', 'error'];

    function reset() {
        boxes.forEach((id) => { $(id).style.display = 'none'; });
        $('meta').textContent = '';
    }

    function show(id, text, target) {
        $(target || id).textContent = text;
        $(id).style.display = 'block';
    }

    $('image').addEventListener('change', (e) => {
        const file = e.target.files[0];
        if (file) { $('preview').src = URL.createObjectURL(file); }
    });

    $('form').addEventListener('submit', async (e) => {
        e.preventDefault();
        reset();

        const data = new FormData();
        data.append('image', $('image').files[0]);
        if ($('token').value.trim()) { data.append('token', $('token').value); }
        data.append('translate', $('translate').checked ? 'true' : 'false');

        $('submit').disabled = true;
        show('info', 'Generating description...');

        try {
            const response = await fetch('/upload', { method: 'POST', body: data });
            const result = await response.json();
            reset();

            if (result.caption) {
                show('captionBox', result.caption, 'caption');
            }
            if (result.translation) {
                show('translationBox', result.translation, 'translation');
            }
            if (result.status === 'loading') {
                show('info', 'The ' + result.stage + ' model is loading. Please submit again in about '
                    + result.retry_after_seconds + ' seconds.');
            } else if (result.status !== 'success') {
                show('error', result.message || 'Request failed');
            }
            $('meta').textContent = 'Processing: ' + result.processing_time_ms + ' ms';
        } catch (err) {
            reset();
            show('error', 'Error: ' + err.message);
        } finally {
            $('submit').disabled = false;
        }
    });
</script>
</body>
</html>
        "#,
    )
}
