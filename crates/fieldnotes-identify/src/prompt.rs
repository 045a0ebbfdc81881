//! Instruction text sent to the models.

use fieldnotes_core::Observation;

/// Fixed instruction for the identification call. The output schema is
/// embedded verbatim.
pub const IDENTIFY_INSTRUCTION: &str = r#"You are a cautious but helpful mushroom identification assistant.

You are analyzing a photograph of a wild mushroom. Use ONLY what is visible in the photo.
If you are not reasonably confident, choose a higher-level group (e.g. "Amanita species") rather than an exact species.

Return STRICTLY a JSON object with this shape:

{
  "imageFile": string,
  "scientificName": string,
  "commonName": string,
  "confidence": integer 0-100,
  "edibility": "Unknown" | "Edible" | "Edible with Caution" | "Inedible" | "Toxic" | "Psychoactive",
  "warning": string (always a strong foraging safety disclaimer),
  "keyFeatures": {
    "cap": string,
    "gillsOrPores": string,
    "stipe": string,
    "sporePrintColor": string,
    "other": string
  },
  "ecologicalRole": "Unknown" | "Saprotrophic" | "Mycorrhizal" | "Parasitic",
  "habitatNotes": string,
  "funFact": string,
  "cookingOrUsage": string,
  "location": string
}

Rules:
- confidence must be an integer between 0 and 100.
- Do NOT wrap the JSON in backticks or a code block.
- Do NOT add any commentary outside the JSON.
- If you are unsure about edibility, set edibility to "Unknown" and include a strong warning.
- Set location to "Unknown" if it cannot be told from the photo."#;

/// The trailing instruction naming the file to echo back.
pub fn file_name_instruction(file_name: &str) -> String {
  format!("The image file name is \"{file_name}\". Set imageFile to exactly this value.")
}

/// Prompt for the illustrated field-guide card.
pub fn info_card(o: &Observation) -> String {
  let f = &o.key_features;
  format!(
    r#"Create a beautiful, informative field guide card for the mushroom "{common}" ({scientific}).

The card should be designed in a 4:3 aspect ratio (landscape orientation) with a field guide aesthetic. Include:

1. Header: the common name as a large, elegant title with the scientific name in italics below.
2. Key characteristics:
   - Cap: {cap}
   - Gills/Pores: {gills}
   - Stipe (stem): {stipe}
   - Spore print: {spore}
3. Ecology:
   - Ecological role: {role}
   - Habitat: {habitat}
4. Edibility: display "{edibility}" with colour coding (red for toxic, green for edible, amber for caution).
5. Interesting fact: {fact}
6. Safety warning, shown prominently: "{warning}"

Use a cream, aged-paper background, serif headings, clean sans-serif body text and botanical illustration borders.
The card should look like it belongs in a professional mycological field guide."#,
    common = o.common_name,
    scientific = o.scientific_name,
    cap = f.cap,
    gills = f.gills_or_pores,
    stipe = f.stipe,
    spore = f.spore_print_color,
    role = o.ecological_role,
    habitat = o.habitat_notes,
    edibility = o.edibility,
    fact = o.fun_fact,
    warning = o.warning,
  )
}
