//! # Stage Content
//!
//! Static narrative blocks, one per stage. The fallback renderer lays these
//! out in the same sections the completion prompt asks the model for.
//!
//! All text is trusted and inserted without escaping.

use crate::Stage;

/// Narratives for the three time horizons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeline {
    pub days_7: &'static str,
    pub days_14: &'static str,
    pub days_30: &'static str,
}

/// Everything the fallback result says about one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageContent {
    pub title: &'static str,
    /// Continues a sentence that starts with the respondent's name.
    pub current_state: &'static str,
    pub focus: &'static str,
    pub timeline: Timeline,
    pub first_step: &'static str,
    pub recommendation: &'static str,
    pub bonus: &'static str,
}

/// Closing invitation used by the call-to-action template.
pub const CALL_TO_ACTION: &str = "Если хотите пройти этот путь не в одиночку, запишитесь на \
бесплатную консультацию: за 30 минут мы разберём вашу ситуацию и соберём план \
первых шагов именно под вас.";

static STAGE_A: StageContent = StageContent {
    title: "Стадия паузы: силы уходят на адаптацию",
    current_state: "сейчас почти вся ваша энергия уходит на то, чтобы просто держаться: \
новая страна, быт, язык, документы. Желание двигаться есть, но ресурса на него \
пока не хватает, и это нормально.",
    focus: "Сейчас важно не требовать от себя рывка, а вернуть опору: сон, простой режим \
и маленькие действия, которые дают ощущение контроля.",
    timeline: Timeline {
        days_7: "Вы замечаете, что стало чуть спокойнее: появились два-три ритуала, \
на которые можно опереться.",
        days_14: "Возвращается интерес: вы снова ловите себя на мыслях о том, чем \
хотелось бы заниматься.",
        days_30: "У вас есть базовый режим и первая маленькая цель, которая не пугает, \
а радует.",
    },
    first_step: "Выделите сегодня 20 минут только для себя и запишите три вещи, которые \
уже получилось сделать с момента переезда.",
    recommendation: "Сократите список дел на неделю вдвое и оставьте только то, что \
действительно важно. Освободившиеся силы пойдут на восстановление.",
    bonus: "Заведите «банку побед»: каждый вечер добавляйте в неё одно маленькое \
достижение дня.",
};

static STAGE_B: StageContent = StageContent {
    title: "Стадия поиска: ресурс есть, направления нет",
    current_state: "вы уже немного обжились и чувствуете, что готовы к большему, но \
вариантов слишком много, а уверенности в выборе мало. Из-за этого движение \
откладывается.",
    focus: "Сейчас важно сузить выбор: понять, что вам действительно интересно и где ваш \
опыт уже ценен в новой стране.",
    timeline: Timeline {
        days_7: "У вас есть короткий список из двух-трёх направлений вместо десяти.",
        days_14: "Вы поговорили хотя бы с одним человеком, который уже работает в \
выбранной сфере, и проверили свои ожидания.",
        days_30: "Направление выбрано, и вы понимаете, какой навык или шаг нужен первым.",
    },
    first_step: "Выпишите всё, что вы умеете и за что вас благодарили раньше, и отметьте \
пункты, которые пригодятся здесь.",
    recommendation: "Не ищите идеальный вариант. Выберите достаточно хороший и \
проверьте его маленьким экспериментом за две недели.",
    bonus: "Найдите в местных чатах одно сообщество по интересам и представьтесь там \
на этой неделе.",
};

static STAGE_C: StageContent = StageContent {
    title: "Стадия пробы: движение есть, но рывками",
    current_state: "вы уже пробуете: учитесь, откликаетесь, запускаете что-то своё. Но \
после всплеска активности приходит откат, и кажется, что всё стоит на месте.",
    focus: "Сейчас важно превратить рывки в систему: небольшой, но регулярный объём \
действий и честный учёт результата.",
    timeline: Timeline {
        days_7: "У вас есть недельный план с тремя приоритетами, и он выполнен хотя бы \
наполовину.",
        days_14: "Вы видите первые измеримые результаты: отклики, встречи, заявки или \
пройденные уроки.",
        days_30: "Регулярность стала привычкой, а откаты короче и мягче.",
    },
    first_step: "Выберите одно действие, которое двигает вас к цели, и делайте его \
каждый день по 30 минут в течение недели.",
    recommendation: "Отслеживайте не настроение, а действия. Отмечайте выполненное в \
календаре, чтобы видеть прогресс даже в трудные дни.",
    bonus: "Найдите партнёра по цели и договоритесь о коротком созвоне раз в неделю.",
};

static STAGE_D: StageContent = StageContent {
    title: "Стадия роста: пора масштабировать",
    current_state: "у вас уже есть опора, опыт и первые результаты в новой стране. \
Следующий уровень требует не больше усилий, а более точной стратегии.",
    focus: "Сейчас важно выбрать, что даёт наибольший результат, и усилить именно это, \
отказавшись от лишнего.",
    timeline: Timeline {
        days_7: "Вы разобрали свои результаты и знаете, какие два направления дают \
больше всего.",
        days_14: "Вы сделали заметный шаг: подняли цену, подали заявку на новую позицию \
или запустили новый продукт.",
        days_30: "Ваша неделя построена вокруг главного, а доход или влияние заметно \
выросли.",
    },
    first_step: "Посчитайте, какие занятия за последний месяц принесли 80% результата, и \
запланируйте на них больше времени.",
    recommendation: "Делегируйте или уберите хотя бы одну регулярную задачу, которая не \
двигает вас вперёд.",
    bonus: "Поделитесь своим опытом переезда публично: пост или выступление приведут \
к вам новых людей и возможности.",
};

/// The content block for a stage. Every stage has one.
#[must_use]
pub fn content_for(stage: Stage) -> &'static StageContent {
    match stage {
        Stage::A => &STAGE_A,
        Stage::B => &STAGE_B,
        Stage::C => &STAGE_C,
        Stage::D => &STAGE_D,
    }
}
