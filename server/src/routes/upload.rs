use axum::extract::State;
use maud::{html, PreEscaped};

use crate::{
    auth::AuthUser,
    components::{
        layout::{card_page, Page},
        ui::{button::Button, heading::PageHeading},
    },
    state::AppState,
};

/// Runs on file selection: fetch fresh params, then POST the file to the CDN.
/// Reads its endpoints from the `#uploader` data attributes.
const UPLOAD_SCRIPT: &str = r#"
(() => {
  const uploader = document.getElementById("uploader");
  const input = document.getElementById("file");
  const status = document.getElementById("upload-status");

  input.addEventListener("change", async () => {
    const file = input.files[0];
    if (!file) return;

    input.disabled = true;
    status.textContent = "Uploading " + file.name + "...";

    try {
      const authResponse = await fetch(uploader.dataset.authEndpoint, {
        credentials: "same-origin",
        cache: "no-store",
      });
      if (!authResponse.ok) {
        throw new Error("Could not get upload credentials (" + authResponse.status + ")");
      }
      const auth = await authResponse.json();

      const body = new FormData();
      body.append("file", file);
      body.append("fileName", file.name);
      body.append("publicKey", auth.publicKey);
      body.append("token", auth.token);
      body.append("expire", String(auth.expire));
      body.append("signature", auth.signature);

      const uploadResponse = await fetch(uploader.dataset.uploadUrl, { method: "POST", body });
      const result = await uploadResponse.json();
      if (!uploadResponse.ok) {
        throw new Error(result.message || "Upload failed");
      }

      status.textContent = "Uploaded: ";
      const link = document.createElement("a");
      link.href = result.url;
      link.textContent = result.name || result.url;
      link.className = "text-indigo-600 hover:text-indigo-800";
      status.appendChild(link);
    } catch (err) {
      status.textContent = err.message;
    } finally {
      input.disabled = false;
      input.value = "";
    }
  });
})();
"#;

/// Upload page. The browser sends files straight to the CDN
///
/// The page never embeds signed params; the script fetches fresh ones from
/// `/api/upload-auth` right before each upload.
pub async fn upload_page(State(state): State<AppState>, AuthUser { user, .. }: AuthUser) -> Page {
    let media = &state.config.media;

    let body = html! {
        (PageHeading::new("Upload a video", format!("Signed in as {} ({})", user.name, user.email)))

        div id="uploader"
            class="rounded-xl p-6 border border-dashed border-indigo-200 bg-indigo-50"
            data-public-key=(media.public_key)
            data-url-endpoint=(media.url_endpoint)
            data-upload-url=(media.upload_url)
            data-auth-endpoint="/api/upload-auth" {
            label for="file" class="block text-sm font-medium text-gray-700 mb-2" { "Choose a file" }
            input type="file" id="file" name="file" accept="video/*,image/*" class="block w-full text-sm text-gray-700";
            p id="upload-status" class="mt-3 text-sm text-gray-700" role="status" aria-live="polite" {}
        }

        div class="mt-6 space-y-2" {
            (Button::link("Home").href("/").full_width(true))
            (Button::link("Log out").href("/logout").full_width(true))
        }

        script { (PreEscaped(UPLOAD_SCRIPT)) }
    };

    card_page("Upload - reelup", body)
}
