//! Server-rendered HTML pages.

use crate::catch::probability;
use crate::collection::{CaughtPokemon, COLLECTION_LIMIT};
use crate::messages::capitalize;
use crate::pokeapi::PokemonRecord;

pub fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[derive(Default)]
pub struct Flash {
    pub notice: Option<String>,
    pub alert: Option<String>,
}

fn layout(title: &str, logged_in: bool, flash: &Flash, body: &str) -> String {
    let nav = if logged_in {
        r#"<nav><a href="/pokemon/random">Find a Pokémon</a> | <a href="/caught">My collection</a>
<form method="post" action="/logout" style="display:inline"><button type="submit">Log out</button></form></nav>"#
    } else {
        ""
    };
    let notice = flash
        .notice
        .as_deref()
        .map(|n| format!(r#"<p class="notice">{}</p>"#, escape_html(n)))
        .unwrap_or_default();
    let alert = flash
        .alert
        .as_deref()
        .map(|a| format!(r#"<p class="alert">{}</p>"#, escape_html(a)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{title}</title></head>
<body>
{nav}
{notice}{alert}
<main>
{body}
</main>
</body>
</html>"#,
        title = escape_html(title),
    )
}

pub fn login_page(flash: &Flash) -> String {
    layout(
        "Log in",
        false,
        flash,
        r#"<h1>Log in</h1>
<form method="post" action="/login">
<label>Email <input type="email" name="email" required></label>
<button type="submit">Log in</button>
</form>"#,
    )
}

const CATCH_SCRIPT: &str = r#"<script>
async function catchPokemon(id) {
  const res = await fetch(`/pokemon/${id}/catch`, { method: "POST", headers: { "Accept": "application/json" } });
  const data = await res.json();
  const el = document.getElementById("result");
  if (data.limit_reached) {
    el.innerHTML = `<p class="alert">${data.error}</p><p><a href="/caught">Go to your collection</a> to release some Pokémon.</p>`;
  } else if (data.success) {
    el.innerHTML = `<p class="notice">${data.message}</p><p>You now have ${data.pokemon_count}/10 Pokémon.</p>`;
  } else {
    el.innerHTML = `<p class="alert">${data.message || data.error || "Something went wrong."}</p>`;
  }
}
</script>"#;

/// Encounter page. `pokemon` is None when the lookup failed; the reason is in the flash.
pub fn random_page(pokemon: Option<&PokemonRecord>, flash: &Flash) -> String {
    let body = match pokemon {
        Some(pokemon) => {
            let sprite = pokemon
                .sprite_url
                .as_deref()
                .map(|url| format!(r#"<img src="{}" alt="{}">"#, escape_html(url), escape_html(&pokemon.name)))
                .unwrap_or_default();
            format!(
                r#"<h1>A wild {name} appeared!</h1>
{sprite}
<p>Base experience: {exp}</p>
<p>Catch chance: {chance:.0}%</p>
<button onclick="catchPokemon({id})">Throw a Poké Ball</button>
<a href="/pokemon/random">Look for another</a>
<div id="result"></div>
{script}"#,
                name = escape_html(&capitalize(&pokemon.name)),
                exp = pokemon.base_experience,
                chance = probability::probability(pokemon.base_experience) * 100.0,
                id = pokemon.poke_id,
                script = CATCH_SCRIPT,
            )
        }
        None => r#"<h1>No Pokémon around</h1><a href="/pokemon/random">Try again</a>"#.to_string(),
    };
    layout("Find a Pokémon", true, flash, &body)
}

pub fn collection_page(caught: &[CaughtPokemon], flash: &Flash) -> String {
    let mut body = format!(
        "<h1>My collection ({}/{})</h1>\n",
        caught.len(),
        COLLECTION_LIMIT
    );
    if caught.is_empty() {
        body.push_str(r#"<p>You have not caught anything yet. <a href="/pokemon/random">Go find one!</a></p>"#);
    } else {
        body.push_str("<ul>\n");
        for pokemon in caught {
            let sprite = pokemon
                .sprite_url
                .as_deref()
                .map(|url| format!(r#"<img src="{}" alt="">"#, escape_html(url)))
                .unwrap_or_default();
            body.push_str(&format!(
                r#"<li>{sprite} {name} (#{poke_id}, {exp} XP) caught {caught_at}
<form method="post" action="/caught/{id}/release" style="display:inline"><button type="submit">Release</button></form></li>
"#,
                name = escape_html(&capitalize(&pokemon.name)),
                poke_id = pokemon.poke_id,
                exp = pokemon.base_experience,
                caught_at = pokemon.caught_at.format("%Y-%m-%d %H:%M"),
                id = pokemon.id,
            ));
        }
        body.push_str("</ul>");
    }
    layout("My collection", true, flash, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
    }

    #[test]
    fn collection_page_lists_release_forms() {
        let caught = vec![CaughtPokemon {
            id: 7,
            user_id: 1,
            poke_id: 25,
            name: "pikachu".to_string(),
            base_experience: 112,
            sprite_url: None,
            caught_at: Utc::now(),
        }];
        let html = collection_page(
            &caught,
            &Flash {
                notice: Some("Bulbasaur was released back into the wild.".to_string()),
                alert: None,
            },
        );
        assert!(html.contains("My collection (1/10)"));
        assert!(html.contains(r#"action="/caught/7/release""#));
        assert!(html.contains("Pikachu"));
        assert!(html.contains("Bulbasaur was released back into the wild."));
    }

    #[test]
    fn random_page_escapes_names() {
        let pokemon = PokemonRecord {
            poke_id: 1,
            name: "<b>".to_string(),
            base_experience: 0,
            sprite_url: None,
        };
        let html = random_page(Some(&pokemon), &Flash::default());
        assert!(html.contains("&lt;b&gt;"));
        assert!(html.contains("catchPokemon(1)"));
    }
}
